//! Catalog queries, one per object kind.
//!
//! Queries are run with the simple query protocol, so every value arrives as
//! text and SQL NULL is stored as the `"null"` sentinel. With the `*` schema
//! selector the comparison key is prefixed with the schema name and system
//! schemas are skipped; with a named schema, rows are limited to that schema.

use tokio_postgres::{Client, SimpleQueryMessage};

use crate::compare::ObjectKind;
use crate::error::{format_db_error, PgDeltaError, Result};
use crate::row::{Row, SchemaSelector, NULL_SENTINEL};

/// `<column> || '.' || ` when keys must carry the schema, else nothing.
fn key_prefix(column: &str, schema: &SchemaSelector) -> String {
    if schema.is_all() {
        format!("{} || '.' || ", column)
    } else {
        String::new()
    }
}

/// WHERE-clause fragment limiting `column` to the selected schemas.
fn schema_filter(column: &str, schema: &SchemaSelector) -> String {
    match schema {
        SchemaSelector::All => format!(
            "AND {c} NOT LIKE 'pg_%' AND {c} <> 'information_schema'",
            c = column
        ),
        SchemaSelector::Named(name) => format!("AND {} = '{}'", column, name),
    }
}

const ROLE_SQL: &str = "
SELECT r.rolname
    , r.rolsuper
    , r.rolinherit
    , r.rolcreaterole
    , r.rolcreatedb
    , r.rolcanlogin
    , r.rolconnlimit
    , r.rolvaliduntil
    , r.rolreplication
    , ARRAY(SELECT b.rolname
            FROM pg_catalog.pg_auth_members m
            JOIN pg_catalog.pg_roles b ON (m.roleid = b.oid)
            WHERE m.member = r.oid) AS memberof
FROM pg_catalog.pg_roles AS r
ORDER BY r.rolname";

const SCHEMATA_SQL: &str = "
SELECT schema_name
    , schema_owner
FROM information_schema.schemata
WHERE schema_name NOT LIKE 'pg_%'
  AND schema_name <> 'information_schema'
ORDER BY schema_name";

const VIEW_SQL: &str = "
SELECT schemaname || '.' || viewname AS viewname
    , definition
FROM pg_views
WHERE schemaname NOT LIKE 'pg_%'
  AND schemaname <> 'information_schema'
ORDER BY viewname";

const MATVIEW_SQL: &str = "
WITH matviews AS (
    SELECT schemaname || '.' || matviewname AS matviewname
        , definition
    FROM pg_catalog.pg_matviews
    WHERE schemaname NOT LIKE 'pg_%'
)
SELECT matviewname
    , definition
    , COALESCE(string_agg(indexdef, ';' || E'\\n\\n') || ';', '') AS indexdef
FROM matviews
LEFT JOIN pg_catalog.pg_indexes ON matviewname = schemaname || '.' || tablename
GROUP BY matviewname, definition
ORDER BY matviewname";

/// The catalog query for `kind`, rendered for `schema`.
pub fn query_for(kind: ObjectKind, schema: &SchemaSelector) -> String {
    match kind {
        ObjectKind::Schema => SCHEMATA_SQL.to_string(),
        ObjectKind::Role => ROLE_SQL.to_string(),
        ObjectKind::View => VIEW_SQL.to_string(),
        ObjectKind::MatView => MATVIEW_SQL.to_string(),
        ObjectKind::Sequence => format!(
            "
SELECT sequence_schema AS schema_name
    , {prefix}sequence_name AS compare_name
    , sequence_name
    , data_type
    , start_value
    , minimum_value
    , maximum_value
    , increment
    , cycle_option
FROM information_schema.sequences
WHERE true
{filter}",
            prefix = key_prefix("sequence_schema", schema),
            filter = schema_filter("sequence_schema", schema),
        ),
        ObjectKind::Table => format!(
            "
SELECT table_schema
    , {prefix}table_name AS compare_name
    , table_name
    , CASE table_type WHEN 'BASE TABLE' THEN 'TABLE' ELSE table_type END AS table_type
FROM information_schema.tables
WHERE table_type = 'BASE TABLE'
{filter}
ORDER BY compare_name",
            prefix = key_prefix("table_schema", schema),
            filter = schema_filter("table_schema", schema),
        ),
        ObjectKind::Column => format!(
            "
SELECT table_schema
    , {prefix}table_name || '.' || lpad(cast(ordinal_position AS varchar), 5, '0') || column_name AS compare_name
    , table_name
    , column_name
    , data_type
    , is_nullable
    , column_default
    , character_maximum_length
    , is_identity
    , identity_generation
    , substring(udt_name from 2) AS array_type
FROM information_schema.columns
WHERE is_updatable = 'YES'
{filter}
ORDER BY compare_name",
            prefix = key_prefix("table_schema", schema),
            filter = schema_filter("table_schema", schema),
        ),
        ObjectKind::TableColumn => format!(
            "
SELECT a.table_schema
    , {prefix}a.table_name || '.' || column_name AS compare_name
    , a.table_name
    , column_name
    , data_type
    , is_nullable
    , column_default
    , character_maximum_length
    , is_identity
    , identity_generation
    , substring(udt_name from 2) AS array_type
FROM information_schema.columns a
INNER JOIN information_schema.tables b
    ON a.table_schema = b.table_schema
   AND a.table_name = b.table_name
   AND b.table_type = 'BASE TABLE'
WHERE is_updatable = 'YES'
{filter}
ORDER BY compare_name",
            prefix = key_prefix("a.table_schema", schema),
            filter = schema_filter("a.table_schema", schema),
        ),
        ObjectKind::Index => format!(
            "
SELECT {prefix}c.relname || '.' || c2.relname AS compare_name
    , n.nspname AS schema_name
    , c.relname AS table_name
    , c2.relname AS index_name
    , i.indisprimary AS pk
    , i.indisunique AS uq
    , pg_catalog.pg_get_indexdef(i.indexrelid, 0, true) AS index_def
    , pg_catalog.pg_get_constraintdef(con.oid, true) AS constraint_def
    , con.contype AS typ
FROM pg_catalog.pg_index AS i
INNER JOIN pg_catalog.pg_class AS c ON (c.oid = i.indrelid)
INNER JOIN pg_catalog.pg_class AS c2 ON (c2.oid = i.indexrelid)
LEFT OUTER JOIN pg_catalog.pg_constraint con
    ON (con.conrelid = i.indrelid AND con.conindid = i.indexrelid AND con.contype IN ('p', 'u', 'x'))
INNER JOIN pg_catalog.pg_namespace AS n ON (c2.relnamespace = n.oid)
WHERE true
{filter}",
            prefix = key_prefix("n.nspname", schema),
            filter = schema_filter("n.nspname", schema),
        ),
        ObjectKind::ForeignKey => format!(
            "
SELECT {prefix}cl.relname || '.' || c.conname AS compare_name
    , ns.nspname AS schema_name
    , cl.relname AS table_name
    , c.conname AS fk_name
    , pg_catalog.pg_get_constraintdef(c.oid, true) AS constraint_def
FROM pg_catalog.pg_constraint c
INNER JOIN pg_class AS cl ON (c.conrelid = cl.oid)
INNER JOIN pg_namespace AS ns ON (ns.oid = c.connamespace)
WHERE c.contype = 'f'
{filter}",
            prefix = key_prefix("ns.nspname", schema),
            filter = schema_filter("ns.nspname", schema),
        ),
        ObjectKind::Function => format!(
            "
SELECT n.nspname AS schema_name
    , {prefix}p.proname AS compare_name
    , p.proname AS function_name
    , p.oid::regprocedure AS fancy
    , t.typname AS return_type
    , pg_get_functiondef(p.oid) AS definition
FROM pg_proc AS p
JOIN pg_type t ON (p.prorettype = t.oid)
JOIN pg_namespace n ON (n.oid = p.pronamespace)
JOIN pg_language l ON (p.prolang = l.oid AND l.lanname IN ('c', 'plpgsql', 'sql'))
WHERE true
{filter}",
            prefix = key_prefix("n.nspname", schema),
            filter = schema_filter("n.nspname", schema),
        ),
        ObjectKind::Trigger => format!(
            "
SELECT n.nspname AS schema_name
    , {prefix}c.relname || '.' || t.tgname AS compare_name
    , c.relname AS table_name
    , t.tgname AS trigger_name
    , pg_catalog.pg_get_triggerdef(t.oid, true) AS trigger_def
    , t.tgenabled AS enabled
FROM pg_catalog.pg_trigger t
INNER JOIN pg_catalog.pg_class c ON (c.oid = t.tgrelid)
INNER JOIN pg_catalog.pg_namespace n ON (n.oid = c.relnamespace)
WHERE NOT t.tgisinternal
{filter}",
            prefix = key_prefix("n.nspname", schema),
            filter = schema_filter("n.nspname", schema),
        ),
        ObjectKind::Owner => format!(
            "
SELECT n.nspname AS schema_name
    , {prefix}c.relname AS compare_name
    , c.relname AS relationship_name
    , a.rolname AS owner
    , CASE c.relkind
        WHEN 'r' THEN 'TABLE'
        WHEN 'S' THEN 'SEQUENCE'
        WHEN 'v' THEN 'VIEW'
        ELSE c.relkind::varchar END AS type
FROM pg_class AS c
INNER JOIN pg_roles AS a ON (a.oid = c.relowner)
INNER JOIN pg_namespace AS n ON (n.oid = c.relnamespace)
WHERE c.relkind IN ('r', 'S', 'v')
{filter}",
            prefix = key_prefix("n.nspname", schema),
            filter = schema_filter("n.nspname", schema),
        ),
        ObjectKind::GrantRelationship => format!(
            "
SELECT n.nspname AS schema_name
    , {prefix}c.relkind || '.' || c.relname AS compare_name
    , CASE c.relkind
        WHEN 'r' THEN 'TABLE'
        WHEN 'v' THEN 'VIEW'
        WHEN 'S' THEN 'SEQUENCE'
        WHEN 'f' THEN 'FOREIGN TABLE'
        END AS type
    , c.relname AS relationship_name
    , unnest(c.relacl) AS relationship_acl
FROM pg_catalog.pg_class c
LEFT JOIN pg_catalog.pg_namespace n ON (n.oid = c.relnamespace)
WHERE c.relkind IN ('r', 'v', 'S', 'f')
{filter}",
            prefix = key_prefix("n.nspname", schema),
            filter = schema_filter("n.nspname", schema),
        ),
        ObjectKind::GrantAttribute => format!(
            "
SELECT n.nspname AS schema_name
    , {prefix}c.relkind || '.' || c.relname || '.' || a.attname AS compare_name
    , CASE c.relkind
        WHEN 'r' THEN 'TABLE'
        WHEN 'v' THEN 'VIEW'
        WHEN 'f' THEN 'FOREIGN TABLE'
        END AS type
    , c.relname AS relationship_name
    , a.attname AS attribute_name
    , a.attacl AS attribute_acl
FROM pg_catalog.pg_class c
LEFT JOIN pg_catalog.pg_namespace n ON (n.oid = c.relnamespace)
INNER JOIN (SELECT attname, unnest(attacl) AS attacl, attrelid
            FROM pg_catalog.pg_attribute
            WHERE NOT attisdropped AND attacl IS NOT NULL) AS a ON (a.attrelid = c.oid)
WHERE c.relkind IN ('r', 'v', 'f')
{filter}",
            prefix = key_prefix("n.nspname", schema),
            filter = schema_filter("n.nspname", schema),
        ),
    }
}

/// Run the catalog query for `kind` and return every row as text.
pub async fn fetch_rows(
    client: &Client,
    kind: ObjectKind,
    schema: &SchemaSelector,
) -> Result<Vec<Row>> {
    let sql = query_for(kind, schema);
    log::debug!("Reading catalog; kind={}, schema={}", kind, schema);

    let messages = client.simple_query(&sql).await.map_err(|e| {
        if e.is_closed() {
            PgDeltaError::ConnectionLost {
                operation: format!("reading {}", kind),
                detail: e.to_string(),
            }
        } else {
            PgDeltaError::IntrospectionFailed {
                kind: kind.to_string(),
                reason: format_db_error(&e),
            }
        }
    })?;

    let rows: Vec<Row> = messages
        .iter()
        .filter_map(|msg| match msg {
            SimpleQueryMessage::Row(row) => Some(
                row.columns()
                    .iter()
                    .enumerate()
                    .map(|(i, col)| (col.name(), row.get(i).unwrap_or(NULL_SENTINEL)))
                    .collect(),
            ),
            _ => None,
        })
        .collect();

    log::debug!("Catalog read; kind={}, rows={}", kind, rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_prefixes_key_and_skips_system_schemas() {
        let sql = query_for(ObjectKind::Table, &SchemaSelector::All);
        assert!(sql.contains("table_schema || '.' || table_name AS compare_name"));
        assert!(sql.contains("AND table_schema NOT LIKE 'pg_%'"));
        assert!(sql.contains("AND table_schema <> 'information_schema'"));
    }

    #[test]
    fn test_named_schema_limits_rows() {
        let schema = SchemaSelector::Named("app".to_string());
        let sql = query_for(ObjectKind::Index, &schema);
        assert!(sql.contains("SELECT c.relname || '.' || c2.relname AS compare_name"));
        assert!(sql.contains("AND n.nspname = 'app'"));
        assert!(!sql.contains("NOT LIKE"));
    }

    #[test]
    fn test_column_keys_keep_ordinal_position() {
        let sql = query_for(ObjectKind::Column, &SchemaSelector::All);
        assert!(sql.contains("lpad(cast(ordinal_position AS varchar), 5, '0')"));
        let sql = query_for(ObjectKind::TableColumn, &SchemaSelector::All);
        assert!(!sql.contains("ordinal_position"));
        assert!(sql.contains("b.table_type = 'BASE TABLE'"));
    }

    #[test]
    fn test_database_wide_kinds_ignore_selector() {
        let named = SchemaSelector::Named("app".to_string());
        for kind in [ObjectKind::Role, ObjectKind::Schema, ObjectKind::View, ObjectKind::MatView] {
            assert_eq!(query_for(kind, &named), query_for(kind, &SchemaSelector::All));
        }
    }

    #[test]
    fn test_every_kind_has_a_query() {
        for kind in ObjectKind::ALL_KINDS {
            assert!(query_for(*kind, &SchemaSelector::All).contains("SELECT"));
        }
    }
}
