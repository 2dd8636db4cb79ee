//! Indexes, including the ones backing primary key and unique constraints.

use std::cmp::Ordering;

use super::requalify;
use crate::diff::{Entity, Pairing};
use crate::output::Fragment;
use crate::row::{FromRow, Row, NULL_SENTINEL};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub schema_name: String,
    pub compare_name: String,
    pub table_name: String,
    pub index_name: String,
    /// `pg_get_indexdef` output.
    pub index_def: Option<String>,
    /// `pg_get_constraintdef` output when the index backs a constraint.
    pub constraint_def: Option<String>,
    pub primary_key: bool,
    pub unique: bool,
}

impl FromRow for Index {
    fn from_row(row: &Row) -> Self {
        Self {
            schema_name: row.get("schema_name").to_string(),
            compare_name: row.get("compare_name").to_string(),
            table_name: row.get("table_name").to_string(),
            index_name: row.get("index_name").to_string(),
            index_def: row.opt("index_def").filter(|d| !d.is_empty()),
            constraint_def: row.opt("constraint_def"),
            primary_key: row.flag("pk"),
            unique: row.flag("uq"),
        }
    }
}

impl Index {
    fn constraint_text(&self) -> &str {
        self.constraint_def.as_deref().unwrap_or(NULL_SENTINEL)
    }

    /// `ALTER TABLE ... ADD CONSTRAINT ... USING INDEX` for constraint-backed
    /// indexes, qualified with `schema`.
    fn attach_constraint(&self, schema: &str) -> Option<Fragment> {
        let kind = if self.primary_key {
            "PRIMARY KEY"
        } else if self.unique {
            "UNIQUE"
        } else {
            return None;
        };
        Some(Fragment::line(format!(
            "ALTER TABLE {}.{} ADD CONSTRAINT {} {} USING INDEX {};",
            schema, self.table_name, self.index_name, kind, self.index_name
        )))
    }

    /// Drop `other` (the partner's index) and create this one in its place.
    fn recreate(&self, other: &Index, pairing: &Pairing<'_>) -> Vec<Fragment> {
        let mut out = other.drop(&pairing.flipped());
        out.extend(self.add(pairing));
        out
    }
}

impl Entity for Index {
    fn compare(&self, other: &Self) -> Ordering {
        self.compare_name.cmp(&other.compare_name)
    }

    fn check(&self) -> Option<Fragment> {
        (self.table_name.is_empty() || self.index_name.is_empty()).then(|| {
            Fragment::error(format!(
                "-- Comparing (table_name and/or index_name is empty): {}",
                self.compare_name
            ))
        })
    }

    fn add(&self, pairing: &Pairing<'_>) -> Vec<Fragment> {
        let schema = pairing.target_schema(&self.schema_name);
        let Some(ref def) = self.index_def else {
            return vec![Fragment::notice(format!(
                "-- Add unexpected situation: there is no index_def for {}.{} {}",
                schema, self.table_name, self.index_name
            ))];
        };

        let def = requalify(def, " ", &self.schema_name, schema, &self.table_name, " ");
        let mut out = vec![Fragment::line(format!("{};", def))];
        if self.constraint_def.is_some() {
            out.extend(self.attach_constraint(schema));
        }
        out
    }

    fn drop(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        let mut out = Vec::new();
        if let Some(ref constraint) = self.constraint_def {
            out.push(Fragment::notice(
                "-- Warning, this may drop foreign keys pointing at this column.  Make sure you re-run the FOREIGN_KEY diff after running this SQL.",
            ));
            out.push(Fragment::line(format!(
                "ALTER TABLE {}.{} DROP CONSTRAINT {} CASCADE; -- {}",
                self.schema_name, self.table_name, self.index_name, constraint
            )));
        }
        out.push(Fragment::line(format!(
            "DROP INDEX {}.{};",
            self.schema_name, self.index_name
        )));
        out
    }

    fn change(&self, other: &Self, pairing: &Pairing<'_>) -> Vec<Fragment> {
        let (Some(mine), Some(theirs)) = (&self.index_def, &other.index_def) else {
            return vec![Fragment::notice(format!(
                "-- Change: unexpected situation: index_def is empty for {}",
                self.compare_name
            ))];
        };

        let mine = if pairing.cross_schema() {
            requalify(
                mine,
                " ",
                &self.schema_name,
                &other.schema_name,
                &self.table_name,
                " ",
            )
        } else {
            mine.clone()
        };

        if self.constraint_def != other.constraint_def {
            let mut out = vec![
                Fragment::notice(format!("-- CHANGE: Different defs on {}:", self.table_name)),
                Fragment::notice(format!("--    {}", self.constraint_text())),
                Fragment::notice(format!("--    {}", other.constraint_text())),
            ];
            match (&self.constraint_def, &other.constraint_def) {
                (Some(_), None) if mine == *theirs => {
                    out.extend(self.attach_constraint(&other.schema_name));
                }
                _ => out.extend(self.recreate(other, pairing)),
            }
            return out;
        }

        if mine == *theirs {
            return Vec::new();
        }
        let mut out = vec![
            Fragment::notice("--"),
            Fragment::notice("--CHANGE: index defs are different for identical constraint defs:"),
            Fragment::notice(format!("--    {}", mine)),
            Fragment::notice(format!("--    {}", theirs)),
        ];
        out.extend(self.recreate(other, pairing));
        out
    }
}
