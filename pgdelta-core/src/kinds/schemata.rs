//! Schemas (namespaces).

use std::cmp::Ordering;

use crate::diff::{Entity, Pairing};
use crate::output::Fragment;
use crate::row::{FromRow, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schemata {
    pub schema_name: String,
    pub schema_owner: String,
}

impl FromRow for Schemata {
    fn from_row(row: &Row) -> Self {
        Self {
            schema_name: row.get("schema_name").to_string(),
            schema_owner: row.get("schema_owner").to_string(),
        }
    }
}

impl Entity for Schemata {
    fn compare(&self, other: &Self) -> Ordering {
        self.schema_name.cmp(&other.schema_name)
    }

    fn add(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        vec![Fragment::line(format!(
            "CREATE SCHEMA {} AUTHORIZATION {};",
            self.schema_name, self.schema_owner
        ))]
    }

    fn drop(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        vec![Fragment::line(format!(
            "DROP SCHEMA IF EXISTS {};",
            self.schema_name
        ))]
    }

    fn change(&self, _other: &Self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        Vec::new()
    }
}
