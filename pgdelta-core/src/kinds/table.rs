//! Tables. Only existence is compared; columns have their own comparator.

use std::cmp::Ordering;

use crate::diff::{Entity, Pairing};
use crate::output::Fragment;
use crate::row::{FromRow, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub table_schema: String,
    pub compare_name: String,
    pub table_name: String,
    /// `TABLE` for base tables.
    pub table_type: String,
}

impl FromRow for Table {
    fn from_row(row: &Row) -> Self {
        Self {
            table_schema: row.get("table_schema").to_string(),
            compare_name: row.get("compare_name").to_string(),
            table_name: row.get("table_name").to_string(),
            table_type: row.get("table_type").to_string(),
        }
    }
}

impl Entity for Table {
    fn compare(&self, other: &Self) -> Ordering {
        self.compare_name.cmp(&other.compare_name)
    }

    fn add(&self, pairing: &Pairing<'_>) -> Vec<Fragment> {
        vec![Fragment::line(format!(
            "CREATE {} {}.{}();",
            self.table_type,
            pairing.target_schema(&self.table_schema),
            self.table_name
        ))]
    }

    fn drop(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        vec![Fragment::line(format!(
            "DROP {} {}.{};",
            self.table_type, self.table_schema, self.table_name
        ))]
    }

    fn change(&self, _other: &Self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        Vec::new()
    }
}
