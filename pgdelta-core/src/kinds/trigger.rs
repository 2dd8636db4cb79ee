//! Triggers.

use std::cmp::Ordering;

use super::requalify;
use crate::diff::{Entity, Pairing};
use crate::output::Fragment;
use crate::row::{FromRow, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub schema_name: String,
    pub compare_name: String,
    pub table_name: String,
    pub trigger_name: String,
    pub trigger_def: String,
}

impl FromRow for Trigger {
    fn from_row(row: &Row) -> Self {
        Self {
            schema_name: row.get("schema_name").to_string(),
            compare_name: row.get("compare_name").to_string(),
            table_name: row.get("table_name").to_string(),
            trigger_name: row.get("trigger_name").to_string(),
            trigger_def: row.get("trigger_def").to_string(),
        }
    }
}

impl Trigger {
    fn definition_in(&self, schema: &str) -> String {
        requalify(
            &self.trigger_def,
            " ",
            &self.schema_name,
            schema,
            &self.table_name,
            " ",
        )
    }

    fn drop_statement(&self, schema: &str) -> Fragment {
        Fragment::line(format!(
            "DROP TRIGGER {} ON {}.{};",
            self.trigger_name, schema, self.table_name
        ))
    }
}

impl Entity for Trigger {
    fn compare(&self, other: &Self) -> Ordering {
        self.compare_name.cmp(&other.compare_name)
    }

    fn add(&self, pairing: &Pairing<'_>) -> Vec<Fragment> {
        let def = self.definition_in(pairing.target_schema(&self.schema_name));
        vec![Fragment::line(format!("{};", def))]
    }

    fn drop(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        vec![self.drop_statement(&self.schema_name)]
    }

    fn change(&self, other: &Self, pairing: &Pairing<'_>) -> Vec<Fragment> {
        let def = if pairing.cross_schema() {
            self.definition_in(&other.schema_name)
        } else {
            self.trigger_def.clone()
        };
        if def == other.trigger_def {
            return Vec::new();
        }
        vec![
            Fragment::notice("-- This function looks different so we'll drop and recreate it:"),
            self.drop_statement(&other.schema_name),
            Fragment::notice("-- STATEMENT-BEGIN"),
            Fragment::line(format!("{};", def)),
            Fragment::notice("-- STATEMENT-END"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{row, SchemaSelector};

    fn trigger(schema: &str, timing: &str) -> Trigger {
        Trigger::from_row(&row! {
            "schema_name" => schema,
            "compare_name" => "users.users_touch",
            "table_name" => "users",
            "trigger_name" => "users_touch",
            "trigger_def" => format!(
                "CREATE TRIGGER users_touch {} UPDATE ON {}.users FOR EACH ROW EXECUTE FUNCTION touch_updated_at()",
                timing, schema
            ),
        })
    }

    #[test]
    fn test_add_and_drop() {
        let src = SchemaSelector::Named("public".to_string());
        let dst = SchemaSelector::Named("app".to_string());
        let pairing = Pairing::new(&src, &dst);
        assert_eq!(
            trigger("public", "BEFORE").add(&pairing),
            vec![Fragment::line(
                "CREATE TRIGGER users_touch BEFORE UPDATE ON app.users FOR EACH ROW EXECUTE FUNCTION touch_updated_at();"
            )]
        );
        assert_eq!(
            trigger("public", "BEFORE").drop(&pairing),
            vec![Fragment::line("DROP TRIGGER users_touch ON public.users;")]
        );
    }

    #[test]
    fn test_change_drops_on_target_and_recreates() {
        let src = SchemaSelector::Named("public".to_string());
        let dst = SchemaSelector::Named("app".to_string());
        let pairing = Pairing::new(&src, &dst);
        assert!(trigger("public", "BEFORE")
            .change(&trigger("app", "BEFORE"), &pairing)
            .is_empty());

        let out = trigger("public", "BEFORE").change(&trigger("app", "AFTER"), &pairing);
        assert_eq!(out.len(), 5);
        assert_eq!(out[1], Fragment::line("DROP TRIGGER users_touch ON app.users;"));
        assert!(out[3].text().contains("BEFORE UPDATE ON app.users"));
    }
}
