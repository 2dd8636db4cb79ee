//! Raw catalog rows and the schema selector.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::PgDeltaError;

/// Text the row source stores for SQL NULL.
pub const NULL_SENTINEL: &str = "null";

/// One catalog row: field name to text value.
///
/// Rows are built once by the row source and never mutated. Typed records
/// are derived from them through [`FromRow`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Row {
    fields: BTreeMap<String, String>,
}

impl Row {
    /// Field value, or `""` when the field is absent.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    /// Field value, with both absence and the `"null"` sentinel mapped to `None`.
    pub fn opt(&self, field: &str) -> Option<String> {
        match self.fields.get(field) {
            Some(v) if v != NULL_SENTINEL => Some(v.clone()),
            _ => None,
        }
    }

    /// Boolean field. PostgreSQL renders booleans as `t`/`true` and
    /// information_schema uses `YES`/`NO`.
    pub fn flag(&self, field: &str) -> bool {
        matches!(self.get(field), "true" | "t" | "YES")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Conversion from a raw row into a typed record.
///
/// Missing fields read as empty strings, so conversion never fails; the
/// comparators report suspicious rows as diagnostics instead.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Self;
}

/// Which schemas one side of the comparison covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SchemaSelector {
    /// `*`: every non-system schema; keys and DDL are schema-qualified.
    #[default]
    All,
    /// A single named schema.
    Named(String),
}

impl SchemaSelector {
    pub fn is_all(&self) -> bool {
        matches!(self, SchemaSelector::All)
    }

    /// Schema a generated statement should be qualified with when this
    /// selector belongs to the side receiving the statement.
    pub fn qualify<'a>(&'a self, own: &'a str) -> &'a str {
        match self {
            SchemaSelector::All => own,
            SchemaSelector::Named(name) => name,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SchemaSelector::All => "*",
            SchemaSelector::Named(name) => name,
        }
    }
}

impl FromStr for SchemaSelector {
    type Err = PgDeltaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "*" => Ok(SchemaSelector::All),
            "" => Err(PgDeltaError::ConfigError(
                "Schema cannot be empty; use '*' for all schemas".to_string(),
            )),
            name => {
                crate::db::validate_identifier(name)?;
                Ok(SchemaSelector::Named(name.to_string()))
            }
        }
    }
}

impl fmt::Display for SchemaSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build a [`Row`] from `field => value` pairs.
#[cfg(test)]
macro_rules! row {
    ($($field:expr => $value:expr),* $(,)?) => {
        [$(($field.to_string(), $value.to_string())),*]
            .into_iter()
            .collect::<$crate::row::Row>()
    };
}

#[cfg(test)]
pub(crate) use row;
