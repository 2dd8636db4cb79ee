//! Compare two PostgreSQL schemas and generate the SQL that reconciles them.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pgdelta_core::config::{CliOverrides, PgDeltaConfig};
//! use pgdelta_core::PgDelta;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PgDeltaConfig::load(None, &CliOverrides::default())?;
//! let delta = PgDelta::new(config).await?;
//! let report = delta.compare(&["TABLE".to_string(), "INDEX".to_string()]).await?;
//! for fragment in &report.fragments {
//!     println!("{}", fragment.text());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration loading (TOML, env vars, CLI overrides)
//! - [`db`]: Database connections, TLS, retries
//! - [`introspect`]: One catalog query per object kind
//! - [`row`]: Catalog rows as text maps, schema selectors
//! - [`diff`]: The merge-join over two sorted record sequences
//! - [`kinds`]: Per-kind records and the SQL they emit
//! - [`acl`]: `aclitem` parsing for the grant kinds
//! - [`compare`]: Object kinds, script header, per-kind dispatch
//! - [`output`]: Classified output fragments and the output mask
//! - [`error`]: Error types

pub mod acl;
pub mod compare;
pub mod config;
pub mod db;
pub mod diff;
pub mod error;
pub mod introspect;
pub mod kinds;
pub mod output;
pub mod row;

use serde::Serialize;
use tokio_postgres::Client;

use compare::{KindSummary, ObjectKind, Snapshot};
use config::{PgDeltaConfig, Side};
use error::Result;

pub use compare::diff_rows;
pub use config::CliOverrides;
pub use diff::DiffReport;
pub use output::{Fragment, OutputSet};
pub use row::{Row, SchemaSelector};

/// Everything one comparison produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompareReport {
    /// Header notices followed by every kind's fragments, in order.
    pub fragments: Vec<Fragment>,
    pub summaries: Vec<KindSummary>,
}

impl CompareReport {
    pub fn error_count(&self) -> usize {
        self.fragments.iter().filter(|f| f.is_error()).count()
    }
}

/// Main entry point for the pgdelta library.
///
/// Holds one connection to each side. `db1` is the desired state and `db2`
/// the database the generated SQL is meant for.
pub struct PgDelta {
    pub config: PgDeltaConfig,
    db1: Client,
    db2: Client,
}

impl PgDelta {
    /// Connect to both databases.
    ///
    /// If `connect_retries` is configured for a side, that side retries with
    /// exponential backoff.
    pub async fn new(config: PgDeltaConfig) -> Result<Self> {
        // Fail on the wildcard rule before opening any connection.
        config.schemas()?;
        let db1 = db::connect(Side::Db1, &config.db1).await?;
        let db2 = db::connect(Side::Db2, &config.db2).await?;
        Ok(Self { config, db1, db2 })
    }

    /// Create a PgDelta instance with existing clients, `db1` first.
    pub fn with_clients(config: PgDeltaConfig, db1: Client, db2: Client) -> Self {
        Self { config, db1, db2 }
    }

    pub fn client(&self, side: Side) -> &Client {
        match side {
            Side::Db1 => &self.db1,
            Side::Db2 => &self.db2,
        }
    }

    /// Compare the requested kinds, in argument order.
    ///
    /// `args` are kind names as typed by the user (`ALL` expands). The
    /// fragments start with the script header.
    pub async fn compare(&self, args: &[String]) -> Result<CompareReport> {
        let kinds = ObjectKind::parse_list(args)?;
        let (schema1, schema2) = self.config.schemas()?;

        for side in [Side::Db1, Side::Db2] {
            db::check_connection(side, self.client(side)).await?;
        }

        let mut report = CompareReport {
            fragments: compare::header(
                args,
                &db::identify(Side::Db1, self.config.source(Side::Db1)),
                &db::identify(Side::Db2, self.config.source(Side::Db2)),
            ),
            summaries: Vec::with_capacity(kinds.len()),
        };

        for kind in kinds {
            let left = introspect::fetch_rows(&self.db1, kind, &schema1).await?;
            let right = introspect::fetch_rows(&self.db2, kind, &schema2).await?;
            log::debug!(
                "Fetched catalog rows; kind={}, db1_rows={}, db2_rows={}",
                kind,
                left.len(),
                right.len()
            );

            let diff = diff_rows(
                kind,
                Snapshot::new(left, schema1.clone()),
                Snapshot::new(right, schema2.clone()),
            );
            log::info!(
                "Compared kind; kind={}, added={}, dropped={}, changed={}, fragments={}",
                kind,
                diff.added,
                diff.dropped,
                diff.changed,
                diff.fragments.len()
            );

            report.summaries.push(KindSummary::new(kind, &diff));
            report.fragments.extend(diff.fragments);
        }

        Ok(report)
    }
}
