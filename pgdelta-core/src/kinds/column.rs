//! Table columns: type, length, nullability, default and identity.

use std::cmp::Ordering;

use crate::db::quote_ident;
use crate::diff::{Entity, Pairing};
use crate::output::Fragment;
use crate::row::{FromRow, Row};

/// Length used for `character varying` columns that have none.
const DEFAULT_VARCHAR_LENGTH: u32 = 1024;

const VARCHAR: &str = "character varying";

const IDENTITY_WARNING: [&str; 2] = [
    "-- WARNING: identity columns are not supported in PostgreSQL versions < 10.",
    "-- Attempting to create identity columns in earlier versions will probably result in errors.",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub table_schema: String,
    pub compare_name: String,
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub max_length: Option<u32>,
    pub is_identity: bool,
    /// `ALWAYS` or `BY DEFAULT`.
    pub identity_generation: Option<String>,
    /// Element type for `ARRAY` columns (udt name without the leading `_`).
    pub array_type: String,
}

impl FromRow for Column {
    fn from_row(row: &Row) -> Self {
        Self {
            table_schema: row.get("table_schema").to_string(),
            compare_name: row.get("compare_name").to_string(),
            table_name: row.get("table_name").to_string(),
            column_name: row.get("column_name").to_string(),
            data_type: row.get("data_type").to_string(),
            nullable: row.get("is_nullable") != "NO",
            default: row.opt("column_default"),
            max_length: row
                .opt("character_maximum_length")
                .and_then(|v| v.parse().ok()),
            is_identity: row.flag("is_identity"),
            identity_generation: row.opt("identity_generation"),
            array_type: row.get("array_type").to_string(),
        }
    }
}

impl Column {
    /// Declared type, with arrays rendered as `elem[]`.
    pub fn sql_type(&self) -> String {
        if self.data_type == "ARRAY" {
            format!("{}[]", self.array_type)
        } else {
            self.data_type.clone()
        }
    }

    fn generation(&self) -> &str {
        self.identity_generation.as_deref().unwrap_or("BY DEFAULT")
    }

    fn identity_warnings() -> impl Iterator<Item = Fragment> {
        IDENTITY_WARNING.into_iter().map(Fragment::notice)
    }
}

impl Entity for Column {
    fn compare(&self, other: &Self) -> Ordering {
        self.compare_name.cmp(&other.compare_name)
    }

    fn add(&self, pairing: &Pairing<'_>) -> Vec<Fragment> {
        let mut out = Vec::new();
        let schema = pairing.target_schema(&self.table_schema);

        if self.is_identity {
            out.extend(Column::identity_warnings());
        }

        let sql_type = match self.max_length {
            Some(len) if self.data_type == VARCHAR => format!("{}({})", VARCHAR, len),
            _ => self.sql_type(),
        };
        let mut alter = format!(
            "ALTER TABLE {}.{} ADD COLUMN {} {}",
            schema, self.table_name, self.column_name, sql_type
        );
        if !self.nullable {
            alter.push_str(" NOT NULL");
        }
        if let Some(ref default) = self.default {
            alter.push_str(&format!(" DEFAULT {}", default));
        }
        if self.is_identity {
            alter.push_str(&format!(" GENERATED {} AS IDENTITY", self.generation()));
        }
        alter.push(';');
        out.push(Fragment::line(alter));
        out
    }

    fn drop(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        vec![Fragment::line(format!(
            "ALTER TABLE {}.{} DROP COLUMN IF EXISTS {};",
            self.table_schema, self.table_name, self.column_name
        ))]
    }

    fn change(&self, other: &Self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        let mut out = Vec::new();
        let table = format!("{}.{}", other.table_schema, self.table_name);
        let column = &self.column_name;
        let wanted = self.sql_type();
        let current = other.sql_type();

        if wanted == current && wanted == VARCHAR {
            if let Some(len) = self.max_length {
                if other.max_length != Some(len) {
                    if len < other.max_length.unwrap_or(DEFAULT_VARCHAR_LENGTH) {
                        out.push(Fragment::notice(
                            "-- WARNING: The next statement will shorten a character varying column, which may result in data loss.",
                        ));
                    }
                    out.push(Fragment::line(format!(
                        "ALTER TABLE {} ALTER COLUMN {} TYPE {}({});",
                        table, column, VARCHAR, len
                    )));
                }
            }
        }

        if wanted != current {
            out.push(Fragment::notice(format!(
                "-- WARNING: This type change may not work well: ({} to {}).",
                current, wanted
            )));
            if wanted.starts_with("character") {
                if self.max_length.is_none() {
                    out.push(Fragment::notice(format!(
                        "-- WARNING: varchar column has no maximum length.  Setting to {}",
                        DEFAULT_VARCHAR_LENGTH
                    )));
                }
                out.push(Fragment::line(format!(
                    "ALTER TABLE {} ALTER COLUMN {} TYPE {}({});",
                    table,
                    column,
                    wanted,
                    self.max_length.unwrap_or(DEFAULT_VARCHAR_LENGTH)
                )));
            } else {
                out.push(Fragment::line(format!(
                    "ALTER TABLE {} ALTER COLUMN {} TYPE {};",
                    table, column, wanted
                )));
            }
        }

        match (&self.default, &other.default) {
            (None, Some(_)) => out.push(Fragment::line(format!(
                "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT;",
                table, column
            ))),
            (Some(mine), theirs) if theirs.as_ref() != Some(mine) => {
                out.push(Fragment::line(format!(
                    "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {};",
                    table, column, mine
                )))
            }
            _ => {}
        }

        // Identity and NOT NULL interact: identity columns must be NOT NULL,
        // so identity goes before DROP NOT NULL and after SET NOT NULL.
        let identity = if self.is_identity != other.is_identity {
            out.extend(Column::identity_warnings());
            let quoted = format!(
                "ALTER TABLE {}.{} ALTER COLUMN {}",
                quote_ident(&other.table_schema),
                quote_ident(&self.table_name),
                quote_ident(column)
            );
            Some(if self.is_identity {
                Fragment::line(format!(
                    "{} ADD GENERATED {} AS IDENTITY;",
                    quoted,
                    self.generation()
                ))
            } else {
                Fragment::line(format!("{} DROP IDENTITY;", quoted))
            })
        } else {
            None
        };

        if self.nullable != other.nullable {
            if self.nullable {
                out.extend(identity);
                out.push(Fragment::line(format!(
                    "ALTER TABLE {} ALTER COLUMN {} DROP NOT NULL;",
                    table, column
                )));
            } else {
                out.push(Fragment::line(format!(
                    "ALTER TABLE {} ALTER COLUMN {} SET NOT NULL;",
                    table, column
                )));
                out.extend(identity);
            }
        } else {
            out.extend(identity);
        }
        out
    }
}
