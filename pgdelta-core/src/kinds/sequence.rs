//! Sequences. Treated as immutable: differences show up only as add or drop.

use std::cmp::Ordering;

use crate::diff::{Entity, Pairing};
use crate::output::Fragment;
use crate::row::{FromRow, Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub schema_name: String,
    pub compare_name: String,
    pub sequence_name: String,
    pub increment: String,
    pub minimum_value: String,
    pub maximum_value: String,
    pub start_value: String,
}

impl FromRow for Sequence {
    fn from_row(row: &Row) -> Self {
        Self {
            schema_name: row.get("schema_name").to_string(),
            compare_name: row.get("compare_name").to_string(),
            sequence_name: row.get("sequence_name").to_string(),
            increment: row.get("increment").to_string(),
            minimum_value: row.get("minimum_value").to_string(),
            maximum_value: row.get("maximum_value").to_string(),
            start_value: row.get("start_value").to_string(),
        }
    }
}

impl Entity for Sequence {
    fn compare(&self, other: &Self) -> Ordering {
        self.compare_name.cmp(&other.compare_name)
    }

    fn add(&self, pairing: &Pairing<'_>) -> Vec<Fragment> {
        vec![Fragment::line(format!(
            "CREATE SEQUENCE {}.{} INCREMENT {} MINVALUE {} MAXVALUE {} START {};",
            pairing.target_schema(&self.schema_name),
            self.sequence_name,
            self.increment,
            self.minimum_value,
            self.maximum_value,
            self.start_value
        ))]
    }

    fn drop(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        vec![Fragment::line(format!(
            "DROP SEQUENCE {}.{};",
            self.schema_name, self.sequence_name
        ))]
    }

    fn change(&self, _other: &Self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{row, SchemaSelector};

    fn sequence() -> Sequence {
        Sequence::from_row(&row! {
            "schema_name" => "public",
            "compare_name" => "orders_id_seq",
            "sequence_name" => "orders_id_seq",
            "increment" => "1",
            "minimum_value" => "1",
            "maximum_value" => "9223372036854775807",
            "start_value" => "1",
        })
    }

    #[test]
    fn test_add_into_named_schema() {
        let src = SchemaSelector::Named("public".to_string());
        let dst = SchemaSelector::Named("staging".to_string());
        assert_eq!(
            sequence().add(&Pairing::new(&src, &dst)),
            vec![Fragment::line(
                "CREATE SEQUENCE staging.orders_id_seq INCREMENT 1 MINVALUE 1 MAXVALUE 9223372036854775807 START 1;"
            )]
        );
    }

    #[test]
    fn test_drop_and_no_change() {
        let all = SchemaSelector::All;
        let pairing = Pairing::new(&all, &all);
        assert_eq!(
            sequence().drop(&pairing),
            vec![Fragment::line("DROP SEQUENCE public.orders_id_seq;")]
        );
        let mut bigger = sequence();
        bigger.increment = "10".to_string();
        assert!(sequence().change(&bigger, &pairing).is_empty());
    }
}
