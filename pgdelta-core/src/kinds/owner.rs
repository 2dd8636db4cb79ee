//! Relation ownership.

use std::cmp::Ordering;

use crate::diff::{Entity, Pairing};
use crate::output::Fragment;
use crate::row::{FromRow, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub schema_name: String,
    pub compare_name: String,
    pub relationship_name: String,
    /// `TABLE`, `VIEW`, `SEQUENCE`, ...
    pub relationship_type: String,
    pub owner: String,
}

impl FromRow for Owner {
    fn from_row(row: &Row) -> Self {
        Self {
            schema_name: row.get("schema_name").to_string(),
            compare_name: row.get("compare_name").to_string(),
            relationship_name: row.get("relationship_name").to_string(),
            relationship_type: row.get("type").to_string(),
            owner: row.get("owner").to_string(),
        }
    }
}

impl Entity for Owner {
    fn compare(&self, other: &Self) -> Ordering {
        self.compare_name.cmp(&other.compare_name)
    }

    // Missing relations are another kind's job; only point at it.
    fn add(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        vec![Fragment::notice(format!(
            "-- Notice!, db2 has no {} named {}.  First, run pgdelta with the {} option.",
            self.relationship_type, self.relationship_name, self.relationship_type
        ))]
    }

    fn drop(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        vec![Fragment::notice(format!(
            "-- Notice!, db2 has a {} that db1 does not: {}.   First, run pgdelta with the {} option.",
            self.relationship_type, self.relationship_name, self.relationship_type
        ))]
    }

    fn change(&self, other: &Self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        if self.owner == other.owner {
            return Vec::new();
        }
        vec![Fragment::line(format!(
            "ALTER {} {}.{} OWNER TO {};",
            self.relationship_type, other.schema_name, self.relationship_name, self.owner
        ))]
    }
}
