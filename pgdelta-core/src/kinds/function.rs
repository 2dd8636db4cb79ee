//! Functions and procedures, compared by their full `pg_get_functiondef` text.

use std::cmp::Ordering;

use super::requalify;
use crate::diff::{Entity, Pairing};
use crate::output::Fragment;
use crate::row::{FromRow, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub schema_name: String,
    pub compare_name: String,
    pub function_name: String,
    pub definition: String,
}

impl FromRow for Function {
    fn from_row(row: &Row) -> Self {
        Self {
            schema_name: row.get("schema_name").to_string(),
            compare_name: row.get("compare_name").to_string(),
            function_name: row.get("function_name").to_string(),
            definition: row.get("definition").to_string(),
        }
    }
}

impl Function {
    /// The definition with `FUNCTION schema.name(` pointing at `schema`.
    fn definition_in(&self, schema: &str) -> String {
        requalify(
            &self.definition,
            "FUNCTION ",
            &self.schema_name,
            schema,
            &self.function_name,
            "(",
        )
    }
}

/// A multi-line statement, bracketed so it can be split out of the script.
fn statement(body: String) -> [Fragment; 3] {
    [
        Fragment::notice("-- STATEMENT-BEGIN"),
        Fragment::line(format!("{};", body)),
        Fragment::notice("-- STATEMENT-END"),
    ]
}

impl Entity for Function {
    fn compare(&self, other: &Self) -> Ordering {
        self.compare_name.cmp(&other.compare_name)
    }

    fn add(&self, pairing: &Pairing<'_>) -> Vec<Fragment> {
        statement(self.definition_in(pairing.target_schema(&self.schema_name))).to_vec()
    }

    fn drop(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        vec![
            Fragment::notice("-- Note that CASCADE in the statement below will also drop any triggers depending on this function."),
            Fragment::notice("-- Also, if there are two functions with this name, you will want to add arguments to identify the correct one to drop."),
            Fragment::notice("-- (See http://www.postgresql.org/docs/9.4/interactive/sql-dropfunction.html) "),
            Fragment::line(format!(
                "DROP FUNCTION {}.{} CASCADE;",
                self.schema_name, self.function_name
            )),
        ]
    }

    fn change(&self, other: &Self, pairing: &Pairing<'_>) -> Vec<Fragment> {
        let definition = if pairing.cross_schema() {
            self.definition_in(&other.schema_name)
        } else {
            self.definition.clone()
        };
        if definition == other.definition {
            return Vec::new();
        }
        let mut out = vec![Fragment::notice(
            "-- This function is different so we'll recreate it:",
        )];
        out.extend(statement(definition));
        out
    }
}
