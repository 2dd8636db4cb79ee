//! Views. The key is the schema-qualified view name; bodies are not diffed.

use std::cmp::Ordering;

use crate::diff::{Entity, Pairing};
use crate::output::Fragment;
use crate::row::{FromRow, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// `schema.view`.
    pub view_name: String,
    /// `pg_get_viewdef` output, already terminated by `;`.
    pub definition: String,
}

impl FromRow for View {
    fn from_row(row: &Row) -> Self {
        Self {
            view_name: row.get("viewname").to_string(),
            definition: row.get("definition").to_string(),
        }
    }
}

impl Entity for View {
    fn compare(&self, other: &Self) -> Ordering {
        self.view_name.cmp(&other.view_name)
    }

    fn add(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        vec![Fragment::line(format!(
            "CREATE VIEW {} AS {}",
            self.view_name, self.definition
        ))]
    }

    fn drop(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        vec![Fragment::line(format!("DROP VIEW {};", self.view_name))]
    }

    fn change(&self, _other: &Self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{row, SchemaSelector};

    fn view(def: &str) -> View {
        View::from_row(&row! {
            "viewname" => "public.active_users",
            "definition" => def,
        })
    }

    #[test]
    fn test_add_drop_and_unchanged_body() {
        let all = SchemaSelector::All;
        let pairing = Pairing::new(&all, &all);
        let v = view(" SELECT id FROM users WHERE active;");
        assert_eq!(
            v.add(&pairing),
            vec![Fragment::line(
                "CREATE VIEW public.active_users AS  SELECT id FROM users WHERE active;"
            )]
        );
        assert_eq!(
            v.drop(&pairing),
            vec![Fragment::line("DROP VIEW public.active_users;")]
        );
        assert!(v.change(&view(" SELECT id FROM users;"), &pairing).is_empty());
    }
}
