//! Privileges granted on relations and on individual columns.
//!
//! Catalog queries unnest the ACL arrays, so each record holds exactly one
//! ACL item. Records are keyed by relation, grantee role and grantor.

use std::cmp::Ordering;

use crate::acl::{parse_grants, Grants};
use crate::diff::{Entity, Pairing};
use crate::output::Fragment;
use crate::row::{FromRow, Row};

#[derive(Debug, Clone, Copy)]
enum Verb {
    Grant,
    Revoke,
}

/// Render a GRANT or REVOKE, or nothing when there are no privileges to move.
fn privilege_statement(
    verb: Verb,
    privileges: &[&str],
    column: Option<&str>,
    schema: &str,
    relation: &str,
    role: &str,
    tag: &str,
) -> Option<Fragment> {
    if privileges.is_empty() {
        return None;
    }
    let (verb, preposition) = match verb {
        Verb::Grant => ("GRANT", "TO"),
        Verb::Revoke => ("REVOKE", "FROM"),
    };
    let column = column.map(|c| format!(" ({})", c)).unwrap_or_default();
    Some(Fragment::line(format!(
        "{} {}{} ON {}.{} {} {}; -- {}",
        verb,
        privileges.join(", "),
        column,
        schema,
        relation,
        preposition,
        role,
        tag
    )))
}

fn grant_add(grants: &Grants, column: Option<&str>, schema: &str, relation: &str) -> Vec<Fragment> {
    let mut out = grants.errors.clone();
    out.extend(privilege_statement(
        Verb::Grant,
        &grants.privileges,
        column,
        schema,
        relation,
        &grants.role,
        "Add",
    ));
    out
}

fn grant_drop(grants: &Grants, column: Option<&str>, schema: &str, relation: &str) -> Vec<Fragment> {
    let mut out = grants.errors.clone();
    out.extend(privilege_statement(
        Verb::Revoke,
        &grants.privileges,
        column,
        schema,
        relation,
        &grants.role,
        "Drop",
    ));
    out
}

/// Parse errors from both sides, then the grants and revokes that make
/// `theirs` match `mine`.
fn grant_change(
    mine: &Grants,
    theirs: &Grants,
    column: Option<&str>,
    schema: &str,
    relation: &str,
) -> Vec<Fragment> {
    let mut out = mine.errors.clone();
    out.extend(theirs.errors.iter().cloned());
    out.extend(privilege_statement(
        Verb::Grant,
        &mine.missing_from(theirs),
        column,
        schema,
        relation,
        &mine.role,
        "Change",
    ));
    out.extend(privilege_statement(
        Verb::Revoke,
        &theirs.missing_from(mine),
        column,
        schema,
        relation,
        &mine.role,
        "Change",
    ));
    out
}

/// One ACL item on a table, view, sequence or materialized view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantRelationship {
    pub schema_name: String,
    pub compare_name: String,
    /// Relation kind, e.g. `TABLE`.
    pub relationship_type: String,
    pub relationship_name: String,
    pub grants: Grants,
}

impl FromRow for GrantRelationship {
    fn from_row(row: &Row) -> Self {
        Self {
            schema_name: row.get("schema_name").to_string(),
            compare_name: row.get("compare_name").to_string(),
            relationship_type: row.get("type").to_string(),
            relationship_name: row.get("relationship_name").to_string(),
            grants: parse_grants(row.get("relationship_acl")),
        }
    }
}

impl Entity for GrantRelationship {
    fn compare(&self, other: &Self) -> Ordering {
        self.compare_name
            .cmp(&other.compare_name)
            .then_with(|| self.grants.role.cmp(&other.grants.role))
            .then_with(|| self.grants.grantor.cmp(&other.grants.grantor))
    }

    fn add(&self, pairing: &Pairing<'_>) -> Vec<Fragment> {
        grant_add(
            &self.grants,
            None,
            pairing.target_schema(&self.schema_name),
            &self.relationship_name,
        )
    }

    fn drop(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        grant_drop(&self.grants, None, &self.schema_name, &self.relationship_name)
    }

    fn change(&self, other: &Self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        grant_change(
            &self.grants,
            &other.grants,
            None,
            &other.schema_name,
            &self.relationship_name,
        )
    }
}

/// One ACL item on a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantAttribute {
    pub schema_name: String,
    pub compare_name: String,
    pub relationship_type: String,
    pub relationship_name: String,
    pub attribute_name: String,
    pub grants: Grants,
}

impl FromRow for GrantAttribute {
    fn from_row(row: &Row) -> Self {
        Self {
            schema_name: row.get("schema_name").to_string(),
            compare_name: row.get("compare_name").to_string(),
            relationship_type: row.get("type").to_string(),
            relationship_name: row.get("relationship_name").to_string(),
            attribute_name: row.get("attribute_name").to_string(),
            grants: parse_grants(row.get("attribute_acl")),
        }
    }
}

impl Entity for GrantAttribute {
    fn compare(&self, other: &Self) -> Ordering {
        self.compare_name
            .cmp(&other.compare_name)
            .then_with(|| self.grants.role.cmp(&other.grants.role))
            .then_with(|| self.grants.grantor.cmp(&other.grants.grantor))
    }

    fn add(&self, pairing: &Pairing<'_>) -> Vec<Fragment> {
        grant_add(
            &self.grants,
            Some(self.attribute_name.as_str()),
            pairing.target_schema(&self.schema_name),
            &self.relationship_name,
        )
    }

    fn drop(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        grant_drop(
            &self.grants,
            Some(self.attribute_name.as_str()),
            &self.schema_name,
            &self.relationship_name,
        )
    }

    fn change(&self, other: &Self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        grant_change(
            &self.grants,
            &other.grants,
            Some(self.attribute_name.as_str()),
            &other.schema_name,
            &self.relationship_name,
        )
    }
}
