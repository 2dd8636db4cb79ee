//! Materialized views, recreated together with their indexes when the
//! definition changes.

use std::cmp::Ordering;

use crate::diff::{Entity, Pairing};
use crate::output::Fragment;
use crate::row::{FromRow, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatView {
    /// `schema.matview`.
    pub matview_name: String,
    pub definition: String,
    /// Index definitions on the view, one statement per line.
    pub index_def: String,
}

impl FromRow for MatView {
    fn from_row(row: &Row) -> Self {
        Self {
            matview_name: row.get("matviewname").to_string(),
            definition: row.get("definition").to_string(),
            index_def: row.opt("indexdef").unwrap_or_default(),
        }
    }
}

impl MatView {
    fn create(&self) -> Vec<Fragment> {
        let mut out = vec![Fragment::line(format!(
            "CREATE MATERIALIZED VIEW {} AS {}",
            self.matview_name, self.definition
        ))];
        if !self.index_def.is_empty() {
            out.push(Fragment::line(self.index_def.clone()));
        }
        out
    }
}

impl Entity for MatView {
    fn compare(&self, other: &Self) -> Ordering {
        self.matview_name.cmp(&other.matview_name)
    }

    fn add(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        self.create()
    }

    fn drop(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        vec![Fragment::line(format!(
            "DROP MATERIALIZED VIEW {};",
            self.matview_name
        ))]
    }

    fn change(&self, other: &Self, pairing: &Pairing<'_>) -> Vec<Fragment> {
        if self.definition == other.definition {
            return Vec::new();
        }
        let mut out = self.drop(pairing);
        out.extend(self.create());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{row, SchemaSelector};

    fn matview(def: &str, indexdef: &str) -> MatView {
        MatView::from_row(&row! {
            "matviewname" => "public.daily_totals",
            "definition" => def,
            "indexdef" => indexdef,
        })
    }

    #[test]
    fn test_add_with_and_without_indexes() {
        let all = SchemaSelector::All;
        let pairing = Pairing::new(&all, &all);
        let with_index = matview(
            " SELECT day, sum(amount) FROM orders GROUP BY day;",
            "CREATE UNIQUE INDEX daily_totals_day ON public.daily_totals USING btree (day);",
        );
        assert_eq!(with_index.add(&pairing).len(), 2);
        assert_eq!(matview(" SELECT 1;", "null").add(&pairing).len(), 1);
    }

    #[test]
    fn test_change_recreates_on_definition_difference() {
        let all = SchemaSelector::All;
        let pairing = Pairing::new(&all, &all);
        let old = matview(" SELECT 1;", "null");
        let new = matview(" SELECT 2;", "null");
        assert!(old.change(&old.clone(), &pairing).is_empty());
        assert_eq!(
            new.change(&old, &pairing),
            vec![
                Fragment::line("DROP MATERIALIZED VIEW public.daily_totals;"),
                Fragment::line("CREATE MATERIALIZED VIEW public.daily_totals AS  SELECT 2;"),
            ]
        );
    }
}
