//! Object kinds and the per-kind dispatch into the typed diff.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::diff::{diff, Cursor, DiffReport, Entity};
use crate::error::{PgDeltaError, Result};
use crate::kinds::{
    Column, ForeignKey, Function, GrantAttribute, GrantRelationship, Index, MatView, Owner, Role,
    Schemata, Sequence, Table, Trigger, View,
};
use crate::output::Fragment;
use crate::row::{FromRow, Row, SchemaSelector};

/// Keyword that expands to every kind except `TABLE_COLUMN`.
pub const ALL_KEYWORD: &str = "ALL";

/// A category of database object that can be compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectKind {
    Schema,
    Role,
    Sequence,
    Table,
    Column,
    TableColumn,
    Index,
    View,
    #[serde(rename = "MATVIEW")]
    MatView,
    ForeignKey,
    Function,
    Trigger,
    Owner,
    GrantRelationship,
    GrantAttribute,
}

impl ObjectKind {
    /// Every kind, in the order the names are listed.
    pub const ALL_KINDS: &'static [ObjectKind] = &[
        ObjectKind::Schema,
        ObjectKind::Role,
        ObjectKind::Sequence,
        ObjectKind::Table,
        ObjectKind::Column,
        ObjectKind::TableColumn,
        ObjectKind::Index,
        ObjectKind::View,
        ObjectKind::MatView,
        ObjectKind::ForeignKey,
        ObjectKind::Function,
        ObjectKind::Trigger,
        ObjectKind::Owner,
        ObjectKind::GrantRelationship,
        ObjectKind::GrantAttribute,
    ];

    /// Command-line name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Schema => "SCHEMA",
            ObjectKind::Role => "ROLE",
            ObjectKind::Sequence => "SEQUENCE",
            ObjectKind::Table => "TABLE",
            ObjectKind::Column => "COLUMN",
            ObjectKind::TableColumn => "TABLE_COLUMN",
            ObjectKind::Index => "INDEX",
            ObjectKind::View => "VIEW",
            ObjectKind::MatView => "MATVIEW",
            ObjectKind::ForeignKey => "FOREIGN_KEY",
            ObjectKind::Function => "FUNCTION",
            ObjectKind::Trigger => "TRIGGER",
            ObjectKind::Owner => "OWNER",
            ObjectKind::GrantRelationship => "GRANT_RELATIONSHIP",
            ObjectKind::GrantAttribute => "GRANT_ATTRIBUTE",
        }
    }

    /// Whether `ALL` expands to this kind.
    ///
    /// `TABLE_COLUMN` covers the same columns as `COLUMN` with a different key,
    /// so running both would report every column difference twice.
    pub fn in_all(self) -> bool {
        self != ObjectKind::TableColumn
    }

    /// One-line description for listings.
    pub fn description(self) -> &'static str {
        match self {
            ObjectKind::Schema => "schemas (namespaces)",
            ObjectKind::Role => "roles and role membership",
            ObjectKind::Sequence => "sequences",
            ObjectKind::Table => "base tables",
            ObjectKind::Column => "columns of tables and views, keyed by position",
            ObjectKind::TableColumn => "columns of base tables, keyed by name",
            ObjectKind::Index => "indexes and the constraints they back",
            ObjectKind::View => "views",
            ObjectKind::MatView => "materialized views and their indexes",
            ObjectKind::ForeignKey => "foreign key constraints",
            ObjectKind::Function => "functions",
            ObjectKind::Trigger => "triggers",
            ObjectKind::Owner => "relation owners",
            ObjectKind::GrantRelationship => "privileges on relations",
            ObjectKind::GrantAttribute => "privileges on columns",
        }
    }

    /// Whether catalog rows for this kind ignore the schema selector.
    pub fn is_database_wide(self) -> bool {
        matches!(
            self,
            ObjectKind::Schema | ObjectKind::Role | ObjectKind::View | ObjectKind::MatView
        )
    }

    /// Every accepted name, `ALL` first.
    pub fn names() -> Vec<&'static str> {
        std::iter::once(ALL_KEYWORD)
            .chain(Self::ALL_KINDS.iter().map(|k| k.name()))
            .collect()
    }

    /// Resolve command-line arguments to kinds, expanding `ALL`.
    ///
    /// Names are case-insensitive. The result keeps argument order.
    pub fn parse_list<S: AsRef<str>>(args: &[S]) -> Result<Vec<ObjectKind>> {
        let mut kinds = Vec::new();
        for arg in args {
            let name = arg.as_ref().trim().to_uppercase();
            if name == ALL_KEYWORD {
                kinds.extend(Self::ALL_KINDS.iter().copied().filter(|k| k.in_all()));
            } else {
                kinds.push(name.parse()?);
            }
        }
        if kinds.is_empty() {
            return Err(PgDeltaError::ConfigError(
                "at least one object kind is required".to_string(),
            ));
        }
        Ok(kinds)
    }
}

impl FromStr for ObjectKind {
    type Err = PgDeltaError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_uppercase();
        Self::ALL_KINDS
            .iter()
            .copied()
            .find(|k| k.name() == upper)
            .ok_or(PgDeltaError::UnsupportedKind(s.to_string()))
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-kind counters for the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindSummary {
    pub kind: ObjectKind,
    pub added: usize,
    pub dropped: usize,
    pub changed: usize,
}

impl KindSummary {
    pub fn new(kind: ObjectKind, report: &DiffReport) -> Self {
        Self {
            kind,
            added: report.added,
            dropped: report.dropped,
            changed: report.changed,
        }
    }
}

/// The rows one side returned for a kind, with that side's schema selector.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub rows: Vec<Row>,
    pub schema: SchemaSelector,
}

impl Snapshot {
    pub fn new(rows: Vec<Row>, schema: SchemaSelector) -> Self {
        Self { rows, schema }
    }
}

/// Script header: the requested kinds, both sources, and where to run it.
pub fn header(args: &[String], db1: &str, db2: &str) -> Vec<Fragment> {
    vec![
        Fragment::notice(format!("-- schemaType: {}", args.join(" ").to_uppercase())),
        Fragment::notice(db1),
        Fragment::notice(db2),
        Fragment::notice("-- Run the following SQL against db2:"),
    ]
}

/// Type the rows, sort both sides by key and run the merge-join.
fn typed_diff<T: Entity + FromRow>(left: Snapshot, right: Snapshot) -> DiffReport {
    fn cursor<T: Entity + FromRow>(side: Snapshot) -> Cursor<T> {
        let mut records: Vec<T> = side.rows.iter().map(T::from_row).collect();
        records.sort_by(|a, b| Entity::compare(a, b));
        Cursor::new(records, side.schema)
    }
    diff(cursor::<T>(left), cursor::<T>(right))
}

/// Diff the rows of one kind. `left` is db1, `right` is db2.
pub fn diff_rows(kind: ObjectKind, left: Snapshot, right: Snapshot) -> DiffReport {
    match kind {
        ObjectKind::Schema => typed_diff::<Schemata>(left, right),
        ObjectKind::Role => typed_diff::<Role>(left, right),
        ObjectKind::Sequence => typed_diff::<Sequence>(left, right),
        ObjectKind::Table => typed_diff::<Table>(left, right),
        ObjectKind::Column | ObjectKind::TableColumn => typed_diff::<Column>(left, right),
        ObjectKind::Index => typed_diff::<Index>(left, right),
        ObjectKind::View => typed_diff::<View>(left, right),
        ObjectKind::MatView => typed_diff::<MatView>(left, right),
        ObjectKind::ForeignKey => typed_diff::<ForeignKey>(left, right),
        ObjectKind::Function => typed_diff::<Function>(left, right),
        ObjectKind::Trigger => typed_diff::<Trigger>(left, right),
        ObjectKind::Owner => typed_diff::<Owner>(left, right),
        ObjectKind::GrantRelationship => typed_diff::<GrantRelationship>(left, right),
        ObjectKind::GrantAttribute => typed_diff::<GrantAttribute>(left, right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::row;

    fn table_row(name: &str) -> Row {
        row! {
            "table_schema" => "public",
            "compare_name" => name,
            "table_name" => name,
            "table_type" => "TABLE",
        }
    }

    #[test]
    fn test_parse_list_expands_all() {
        let kinds = ObjectKind::parse_list(&["all"]).unwrap();
        assert_eq!(kinds.len(), ObjectKind::ALL_KINDS.len() - 1);
        assert!(!kinds.contains(&ObjectKind::TableColumn));
        assert_eq!(kinds[0], ObjectKind::Schema);
    }

    #[test]
    fn test_parse_list_is_case_insensitive_and_ordered() {
        let kinds = ObjectKind::parse_list(&["index", "Table_Column", "ROLE"]).unwrap();
        assert_eq!(
            kinds,
            vec![ObjectKind::Index, ObjectKind::TableColumn, ObjectKind::Role]
        );
    }

    #[test]
    fn test_parse_list_rejects_unknown() {
        let err = ObjectKind::parse_list(&["TABLE", "TABLES"]).unwrap_err();
        assert!(matches!(err, PgDeltaError::UnsupportedKind(ref k) if k == "TABLES"));
        let empty: [&str; 0] = [];
        assert!(ObjectKind::parse_list(&empty).is_err());
    }

    #[test]
    fn test_names_round_trip() {
        let names = ObjectKind::names();
        assert_eq!(names[0], "ALL");
        for kind in ObjectKind::ALL_KINDS {
            assert_eq!(kind.name().parse::<ObjectKind>().unwrap(), *kind);
            assert!(names.contains(&kind.name()));
        }
    }

    #[test]
    fn test_header() {
        let args = vec!["table".to_string(), "index".to_string()];
        let h = header(&args, "-- db1: a", "-- db2: b");
        let texts: Vec<&str> = h.iter().map(Fragment::text).collect();
        assert_eq!(
            texts,
            vec![
                "-- schemaType: TABLE INDEX",
                "-- db1: a",
                "-- db2: b",
                "-- Run the following SQL against db2:",
            ]
        );
        assert!(h.iter().all(|f| matches!(f, Fragment::Notice(_))));
    }

    #[test]
    fn test_diff_rows_sorts_unsorted_input() {
        let left = Snapshot::new(
            vec![table_row("orders"), table_row("accounts")],
            SchemaSelector::All,
        );
        let right = Snapshot::new(vec![table_row("orders")], SchemaSelector::All);
        let report = diff_rows(ObjectKind::Table, left, right);
        assert_eq!(
            report.fragments,
            vec![Fragment::line("CREATE TABLE public.accounts();")]
        );
        assert_eq!(KindSummary::new(ObjectKind::Table, &report).changed, 1);
    }

    #[test]
    fn test_diff_rows_identical_sides_are_silent() {
        let rows = vec![table_row("a"), table_row("b")];
        let report = diff_rows(
            ObjectKind::Table,
            Snapshot::new(rows.clone(), SchemaSelector::All),
            Snapshot::new(rows, SchemaSelector::All),
        );
        assert!(report.fragments.is_empty());
    }

    /// A realistic catalog row for each kind.
    fn sample_row(kind: ObjectKind) -> Row {
        match kind {
            ObjectKind::Schema => row! {
                "schema_name" => "app",
                "schema_owner" => "postgres",
            },
            ObjectKind::Role => row! {
                "rolname" => "app",
                "rolsuper" => "f",
                "rolinherit" => "t",
                "rolcreaterole" => "f",
                "rolcreatedb" => "t",
                "rolcanlogin" => "t",
                "rolreplication" => "f",
                "rolconnlimit" => "-1",
                "rolvaliduntil" => "null",
                "memberof" => "{readers}",
            },
            ObjectKind::Sequence => row! {
                "schema_name" => "public",
                "compare_name" => "orders_id_seq",
                "sequence_name" => "orders_id_seq",
                "data_type" => "bigint",
                "start_value" => "1",
                "minimum_value" => "1",
                "maximum_value" => "9223372036854775807",
                "increment" => "1",
                "cycle_option" => "NO",
            },
            ObjectKind::Table => table_row("orders"),
            ObjectKind::Column | ObjectKind::TableColumn => row! {
                "table_schema" => "public",
                "compare_name" => "orders.00002email",
                "table_name" => "orders",
                "column_name" => "email",
                "data_type" => "character varying",
                "is_nullable" => "NO",
                "column_default" => "''::character varying",
                "character_maximum_length" => "200",
                "is_identity" => "NO",
                "identity_generation" => "null",
                "array_type" => "archar",
            },
            ObjectKind::Index => row! {
                "compare_name" => "orders.orders_pkey",
                "schema_name" => "public",
                "table_name" => "orders",
                "index_name" => "orders_pkey",
                "pk" => "t",
                "uq" => "t",
                "index_def" => "CREATE UNIQUE INDEX orders_pkey ON public.orders USING btree (id)",
                "constraint_def" => "PRIMARY KEY (id)",
            },
            ObjectKind::View => row! {
                "viewname" => "public.open_orders",
                "definition" => " SELECT orders.id FROM orders WHERE orders.open;",
            },
            ObjectKind::MatView => row! {
                "matviewname" => "public.order_totals",
                "definition" => " SELECT sum(orders.total) AS total FROM orders;",
                "indexdef" => "CREATE INDEX order_totals_idx ON public.order_totals USING btree (total)",
            },
            ObjectKind::ForeignKey => row! {
                "compare_name" => "orders.orders_customer_fk",
                "schema_name" => "public",
                "table_name" => "orders",
                "fk_name" => "orders_customer_fk",
                "constraint_def" => "FOREIGN KEY (customer_id) REFERENCES customers(id)",
            },
            ObjectKind::Function => row! {
                "compare_name" => "touch",
                "schema_name" => "public",
                "function_name" => "touch",
                "definition" => "CREATE OR REPLACE FUNCTION public.touch()\n RETURNS trigger\n LANGUAGE plpgsql\nAS $$BEGIN RETURN NEW; END$$",
            },
            ObjectKind::Trigger => row! {
                "compare_name" => "orders.orders_touch",
                "schema_name" => "public",
                "table_name" => "orders",
                "trigger_name" => "orders_touch",
                "trigger_def" => "CREATE TRIGGER orders_touch BEFORE UPDATE ON public.orders FOR EACH ROW EXECUTE FUNCTION public.touch()",
            },
            ObjectKind::Owner => row! {
                "schema_name" => "public",
                "compare_name" => "orders",
                "relationship_name" => "orders",
                "type" => "TABLE",
                "owner" => "app",
            },
            ObjectKind::GrantRelationship => row! {
                "schema_name" => "public",
                "compare_name" => "orders",
                "type" => "TABLE",
                "relationship_name" => "orders",
                "relationship_acl" => "app=arwd/postgres",
            },
            ObjectKind::GrantAttribute => row! {
                "schema_name" => "public",
                "compare_name" => "orders.email",
                "type" => "TABLE",
                "relationship_name" => "orders",
                "attribute_name" => "email",
                "attribute_acl" => "reporting=r/postgres",
            },
        }
    }

    #[test]
    fn test_identity_law_every_kind() {
        for kind in ObjectKind::ALL_KINDS {
            let rows = vec![sample_row(*kind)];
            for (left, right) in [
                (SchemaSelector::All, SchemaSelector::All),
                (
                    SchemaSelector::Named("public".to_string()),
                    SchemaSelector::Named("public".to_string()),
                ),
            ] {
                let report = diff_rows(
                    *kind,
                    Snapshot::new(rows.clone(), left),
                    Snapshot::new(rows.clone(), right),
                );
                assert!(report.fragments.is_empty(), "{}: {:?}", kind, report.fragments);
                assert_eq!(report.changed, 1, "{}", kind);
            }
        }
    }
}
