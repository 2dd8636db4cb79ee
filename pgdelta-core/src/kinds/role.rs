//! Database roles and their group memberships.

use std::cmp::Ordering;

use crate::diff::{Entity, Pairing};
use crate::output::Fragment;
use crate::row::{FromRow, Row};

/// Placeholder password for created roles; the DBA is expected to change it.
const DEFAULT_PASSWORD: &str = "changeme";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub superuser: bool,
    pub inherit: bool,
    pub create_role: bool,
    pub create_db: bool,
    pub can_login: bool,
    pub replication: bool,
    /// `-1` means unlimited.
    pub connection_limit: Option<i32>,
    pub valid_until: Option<String>,
    /// Roles this role is a member of.
    pub member_of: Vec<String>,
}

/// Parse a PostgreSQL array literal such as `{admins,readers}`.
fn parse_member_list(raw: &str) -> Vec<String> {
    raw.trim_matches(|c| c == '{' || c == '}')
        .split(',')
        .map(|m| m.trim().trim_matches('"'))
        .filter(|m| !m.is_empty() && *m != "NULL")
        .map(str::to_string)
        .collect()
}

impl FromRow for Role {
    fn from_row(row: &Row) -> Self {
        Self {
            name: row.get("rolname").to_string(),
            superuser: row.flag("rolsuper"),
            inherit: row.flag("rolinherit"),
            create_role: row.flag("rolcreaterole"),
            create_db: row.flag("rolcreatedb"),
            can_login: row.flag("rolcanlogin"),
            replication: row.flag("rolreplication"),
            connection_limit: row.get("rolconnlimit").parse().ok(),
            valid_until: row.opt("rolvaliduntil"),
            member_of: parse_member_list(row.get("memberof")),
        }
    }
}

fn toggle(enabled: bool, on: &str, off: &str) -> String {
    let word = if enabled { on } else { off };
    word.to_string()
}

impl Entity for Role {
    fn compare(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }

    fn add(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        let mut options = vec![format!("WITH PASSWORD '{}'", DEFAULT_PASSWORD)];
        options.push(toggle(self.can_login, "LOGIN", "NOLOGIN"));
        if self.superuser {
            options.push("SUPERUSER".to_string());
        }
        if self.create_db {
            options.push("CREATEDB".to_string());
        }
        if self.create_role {
            options.push("CREATEROLE".to_string());
        }
        options.push(toggle(self.inherit, "INHERIT", "NOINHERIT"));
        options.push(toggle(self.replication, "REPLICATION", "NOREPLICATION"));
        if let Some(limit) = self.connection_limit.filter(|l| *l != -1) {
            options.push(format!("CONNECTION LIMIT {}", limit));
        }
        if let Some(ref until) = self.valid_until {
            options.push(format!("VALID UNTIL '{}'", until));
        }
        vec![Fragment::line(format!(
            "CREATE ROLE {} {};",
            self.name,
            options.join(" ")
        ))]
    }

    fn drop(&self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        vec![Fragment::line(format!("DROP ROLE {};", self.name))]
    }

    fn change(&self, other: &Self, _pairing: &Pairing<'_>) -> Vec<Fragment> {
        let mut out = Vec::new();
        let mut options = Vec::new();

        let flags = [
            (self.superuser, other.superuser, "SUPERUSER", "NOSUPERUSER"),
            (self.can_login, other.can_login, "LOGIN", "NOLOGIN"),
            (self.create_db, other.create_db, "CREATEDB", "NOCREATEDB"),
            (self.create_role, other.create_role, "CREATEROLE", "NOCREATEROLE"),
            (self.inherit, other.inherit, "INHERIT", "NOINHERIT"),
            (self.replication, other.replication, "REPLICATION", "NOREPLICATION"),
        ];
        for (mine, theirs, on, off) in flags {
            if mine != theirs {
                options.push(toggle(mine, on, off));
            }
        }
        if self.connection_limit != other.connection_limit {
            if let Some(limit) = self.connection_limit {
                options.push(format!("CONNECTION LIMIT {}", limit));
            }
        }
        if self.valid_until != other.valid_until {
            if let Some(ref until) = self.valid_until {
                options.push(format!("VALID UNTIL '{}'", until));
            }
        }
        if !options.is_empty() {
            out.push(Fragment::line(format!(
                "ALTER ROLE {} {};",
                self.name,
                options.join(" ")
            )));
        }

        for group in self.member_of.iter().filter(|g| !other.member_of.contains(g)) {
            out.push(Fragment::line(format!("GRANT {} TO {};", group, self.name)));
        }
        for group in other.member_of.iter().filter(|g| !self.member_of.contains(g)) {
            out.push(Fragment::line(format!(
                "REVOKE {} FROM {};",
                group, self.name
            )));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{row, SchemaSelector};

    fn role(name: &str) -> Role {
        Role::from_row(&row! {
            "rolname" => name,
            "rolsuper" => "false",
            "rolinherit" => "true",
            "rolcreaterole" => "false",
            "rolcreatedb" => "false",
            "rolcanlogin" => "true",
            "rolreplication" => "false",
            "rolconnlimit" => "-1",
            "rolvaliduntil" => "null",
            "memberof" => "{}",
        })
    }

    fn check<F: FnOnce(&Pairing<'_>)>(f: F) {
        let all = SchemaSelector::All;
        f(&Pairing::new(&all, &all));
    }

    #[test]
    fn test_member_list_parsing() {
        assert!(parse_member_list("{}").is_empty());
        assert_eq!(parse_member_list("{admins,readers}"), vec!["admins", "readers"]);
        assert_eq!(parse_member_list("{\"Ops Team\"}"), vec!["Ops Team"]);
    }

    #[test]
    fn test_add_role() {
        let mut r = role("app");
        r.create_db = true;
        r.connection_limit = Some(10);
        r.valid_until = Some("2030-01-01 00:00:00+00".to_string());
        check(|p| {
            assert_eq!(
                r.add(p),
                vec![Fragment::line(
                    "CREATE ROLE app WITH PASSWORD 'changeme' LOGIN CREATEDB INHERIT NOREPLICATION CONNECTION LIMIT 10 VALID UNTIL '2030-01-01 00:00:00+00';"
                )]
            );
        });
    }

    #[test]
    fn test_add_role_unlimited_connections_omitted() {
        let mut r = role("reporting");
        r.can_login = false;
        check(|p| {
            assert_eq!(
                r.add(p),
                vec![Fragment::line(
                    "CREATE ROLE reporting WITH PASSWORD 'changeme' NOLOGIN INHERIT NOREPLICATION;"
                )]
            );
        });
    }

    #[test]
    fn test_change_flags_and_membership() {
        let mut desired = role("app");
        desired.superuser = true;
        desired.can_login = false;
        desired.member_of = vec!["admins".to_string(), "readers".to_string()];
        let mut current = role("app");
        current.member_of = vec!["readers".to_string(), "legacy".to_string()];
        check(|p| {
            assert_eq!(
                desired.change(&current, p),
                vec![
                    Fragment::line("ALTER ROLE app SUPERUSER NOLOGIN;"),
                    Fragment::line("GRANT admins TO app;"),
                    Fragment::line("REVOKE legacy FROM app;"),
                ]
            );
        });
    }

    #[test]
    fn test_identical_roles_produce_nothing() {
        let r = role("app");
        check(|p| assert!(r.change(&r.clone(), p).is_empty()));
    }

    #[test]
    fn test_drop_role() {
        check(|p| {
            assert_eq!(role("old").drop(p), vec![Fragment::line("DROP ROLE old;")]);
        });
    }
}
