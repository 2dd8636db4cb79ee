//! Foreign key constraints.
//!
//! The definition is part of the key, so a changed constraint never matches
//! and shows up as a drop of the old one and an add of the new one.

use std::cmp::Ordering;

use crate::diff::{Entity, Pairing};
use crate::output::Fragment;
use crate::row::{FromRow, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub schema_name: String,
    pub compare_name: String,
    pub table_name: String,
    pub fk_name: String,
    pub constraint_def: String,
}

impl FromRow for ForeignKey {
    fn from_row(row: &Row) -> Self {
        Self {
            schema_name: row.get("schema_name").to_string(),
            compare_name: row.get("compare_name").to_string(),
            table_name: row.get("table_name").to_string(),
            fk_name: row.get("fk_name").to_string(),
            constraint_def: row.get("constraint_def").to_string(),
        }
    }
}

impl Entity for ForeignKey {
    fn compare(&self, other: &Self) -> Ordering {
        self.compare_name
            .cmp(&other.compare_name)
            .then_with(|| self.constraint_def.cmp(&other.constraint_def))
    }

    fn add(&self, pairing: &Pairing<'_>) -> Vec<Fragment> {
        vec![Fragment::line(format!(
            "ALTER TABLE {}.{} ADD CONSTRAINT {} {};",
            pairing.target_schema(&self.schema_name),
            self.table_name,
            self.fk_name,
            self.constraint_def
        ))]
    }

    fn drop(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        vec![Fragment::line(format!(
            "ALTER TABLE {}.{} DROP CONSTRAINT {}; -- {}",
            self.schema_name, self.table_name, self.fk_name, self.constraint_def
        ))]
    }

    fn change(&self, _other: &Self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        Vec::new()
    }
}
