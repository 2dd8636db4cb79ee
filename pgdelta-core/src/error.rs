//! Error types for pgdelta operations.
//!
//! Only the driver layer (config, connections, catalog queries) produces these.
//! Problems found while diffing are reported as `Fragment::Error` values in the
//! output instead.

use thiserror::Error;

/// Extract the full error message from a tokio_postgres::Error,
/// including the underlying DbError details that Display hides.
pub fn format_db_error(e: &tokio_postgres::Error) -> String {
    if let Some(db_err) = e.as_db_error() {
        let mut msg = db_err.message().to_string();
        if let Some(detail) = db_err.detail() {
            msg.push_str(&format!("\n  Detail: {}", detail));
        }
        if let Some(hint) = db_err.hint() {
            msg.push_str(&format!("\n  Hint: {}", hint));
        }
        return msg;
    }
    let mut msg = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(s) = source {
        msg.push_str(&format!(": {}", s));
        source = s.source();
    }
    if e.is_closed() {
        msg.push_str("\n  Note: The database connection was closed unexpectedly.");
    }
    msg
}

/// All error types that pgdelta can produce.
#[derive(Error, Debug)]
pub enum PgDeltaError {
    /// Invalid or missing configuration (TOML parse errors, missing connection fields, bad flags).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A database query or connection operation failed.
    #[error("Database error: {}", format_db_error(.0))]
    DatabaseError(#[from] tokio_postgres::Error),

    /// A filesystem I/O operation failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// An object kind name on the command line is not one pgdelta knows.
    #[error("Unsupported object kind '{0}'. Valid kinds: {valid}", valid = crate::compare::ObjectKind::names().join(", "))]
    UnsupportedKind(String),

    /// Exactly one side was configured with the `*` wildcard schema.
    #[error("If one schema is an asterisk, both must be (db1 schema: {db1}, db2 schema: {db2})")]
    SchemaMismatch { db1: String, db2: String },

    /// A catalog query returned something the row source could not use.
    #[error("Introspection of {kind} failed: {reason}")]
    IntrospectionFailed { kind: String, reason: String },

    /// The database connection was lost during an operation.
    #[error("Connection lost during {operation}: {detail}")]
    ConnectionLost { operation: String, detail: String },
}

/// Convenience type alias for `Result<T, PgDeltaError>`.
pub type Result<T> = std::result::Result<T, PgDeltaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_message() {
        let err = PgDeltaError::SchemaMismatch {
            db1: "*".to_string(),
            db2: "public".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "If one schema is an asterisk, both must be (db1 schema: *, db2 schema: public)"
        );
    }

    #[test]
    fn test_unsupported_kind_lists_valid_names() {
        let err = PgDeltaError::UnsupportedKind("TABLES".to_string());
        let msg = err.to_string();
        assert!(msg.starts_with("Unsupported object kind 'TABLES'"));
        assert!(msg.contains("GRANT_ATTRIBUTE"));
        assert!(msg.contains("ALL"));
    }
}
