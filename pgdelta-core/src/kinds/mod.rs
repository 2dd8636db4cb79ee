//! Typed catalog records, one module per object kind.
//!
//! Each record is built from a catalog [`Row`](crate::row::Row) and implements
//! [`Entity`](crate::diff::Entity) with the SQL policy for its kind.

pub mod column;
pub mod foreign_key;
pub mod function;
pub mod grant;
pub mod index;
pub mod matview;
pub mod owner;
pub mod role;
pub mod schemata;
pub mod sequence;
pub mod table;
pub mod trigger;
pub mod view;

pub use column::Column;
pub use foreign_key::ForeignKey;
pub use function::Function;
pub use grant::{GrantAttribute, GrantRelationship};
pub use index::Index;
pub use matview::MatView;
pub use owner::Owner;
pub use role::Role;
pub use schemata::Schemata;
pub use sequence::Sequence;
pub use table::Table;
pub use trigger::Trigger;
pub use view::View;

/// Replace every `{prefix}{from}.{name}{suffix}` in a definition with the same
/// reference in schema `to`.
///
/// Catalog functions such as `pg_get_indexdef` embed the schema name, so a
/// definition copied into a differently named schema must be rewritten.
pub(crate) fn requalify(
    definition: &str,
    prefix: &str,
    from: &str,
    to: &str,
    name: &str,
    suffix: &str,
) -> String {
    if from == to {
        return definition.to_string();
    }
    definition.replace(
        &format!("{prefix}{from}.{name}{suffix}"),
        &format!("{prefix}{to}.{name}{suffix}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requalify_index_definition() {
        let def = "CREATE INDEX users_email_idx ON public.users USING btree (email)";
        assert_eq!(
            requalify(def, " ", "public", "app", "users", " "),
            "CREATE INDEX users_email_idx ON app.users USING btree (email)"
        );
    }

    #[test]
    fn test_requalify_same_schema_is_identity() {
        let def = "CREATE OR REPLACE FUNCTION public.f()";
        assert_eq!(requalify(def, "FUNCTION ", "public", "public", "f", "("), def);
    }

    #[test]
    fn test_requalify_leaves_other_tables_alone() {
        let def = "CREATE INDEX i ON public.users_archive USING btree (id)";
        assert_eq!(requalify(def, " ", "public", "app", "users", " "), def);
    }
}
