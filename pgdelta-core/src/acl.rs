//! PostgreSQL ACL item parsing.
//!
//! An ACL item looks like `role=privs/grantor`, e.g. `bob=arw/admin`. An
//! empty role means `PUBLIC`. Each privilege letter may be followed by `*`,
//! marking the grant option.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::output::Fragment;

static ACL_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)=([A-Za-z*]*)/(.*)$").unwrap());

/// Keyword for a privilege letter, or `None` for letters we do not map.
fn privilege_word(letter: char) -> Option<&'static str> {
    match letter {
        'a' => Some("INSERT"),
        'r' => Some("SELECT"),
        'w' => Some("UPDATE"),
        'd' => Some("DELETE"),
        'D' => Some("TRUNCATE"),
        'x' => Some("REFERENCES"),
        't' => Some("TRIGGER"),
        'X' => Some("EXECUTE"),
        'U' => Some("USAGE"),
        'C' => Some("CREATE"),
        'c' => Some("CONNECT"),
        'T' => Some("TEMPORARY"),
        _ => None,
    }
}

/// Role, privilege letters and grantor of an ACL item.
fn split_acl(acl: &str) -> Option<(&str, &str, &str)> {
    let caps = ACL_ITEM_RE.captures(acl.trim())?;
    let role = caps.get(1).map_or("", |m| m.as_str());
    let privs = caps.get(2).map_or("", |m| m.as_str());
    let grantor = caps.get(3).map_or("", |m| m.as_str());
    Some((if role.is_empty() { "public" } else { role }, privs, grantor))
}

/// Split an ACL item into its role and privilege letters.
///
/// Returns empty strings when the item does not look like an ACL entry.
pub fn parse_acl(acl: &str) -> (String, String) {
    split_acl(acl)
        .map(|(role, privs, _)| (role.to_string(), privs.to_string()))
        .unwrap_or_default()
}

/// A parsed ACL item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grants {
    pub role: String,
    /// Role that granted the privileges. A grantee can hold one item per grantor.
    pub grantor: String,
    /// Privilege keywords, sorted.
    pub privileges: Vec<&'static str>,
    /// One error fragment per privilege letter that has no keyword.
    pub errors: Vec<Fragment>,
}

impl Grants {
    /// Keywords present here and absent from `other`, in sorted order.
    pub fn missing_from(&self, other: &Grants) -> Vec<&'static str> {
        self.privileges
            .iter()
            .filter(|p| !other.privileges.contains(p))
            .copied()
            .collect()
    }
}

/// Parse an ACL item into a role and sorted privilege keywords.
pub fn parse_grants(acl: &str) -> Grants {
    let (role, letters, grantor) = split_acl(acl).unwrap_or_default();
    let mut grants = Grants {
        role: role.to_string(),
        grantor: grantor.to_string(),
        ..Default::default()
    };
    for letter in letters.chars().filter(|c| *c != '*') {
        match privilege_word(letter) {
            Some(word) => grants.privileges.push(word),
            None => grants.errors.push(Fragment::error(format!(
                "-- Error, found permission character we haven't coded for: {}",
                letter
            ))),
        }
    }
    grants.privileges.sort_unstable();
    grants.privileges.dedup();
    grants
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_acl_named_role() {
        assert_eq!(
            parse_acl("bob=rwa/admin"),
            ("bob".to_string(), "rwa".to_string())
        );
    }

    #[test]
    fn test_parse_acl_public() {
        assert_eq!(
            parse_acl("=r/postgres"),
            ("public".to_string(), "r".to_string())
        );
    }

    #[test]
    fn test_parse_acl_quoted_role() {
        let (role, privs) = parse_acl("\"app user\"=arwdDxt/owner");
        assert_eq!(role, "\"app user\"");
        assert_eq!(privs, "arwdDxt");
    }

    #[test]
    fn test_parse_acl_garbage() {
        assert_eq!(parse_acl("not an acl"), (String::new(), String::new()));
        assert_eq!(parse_acl(""), (String::new(), String::new()));
    }

    #[test]
    fn test_parse_grants_sorted_keywords() {
        let grants = parse_grants("bob=rwa/admin");
        assert_eq!(grants.role, "bob");
        assert_eq!(grants.grantor, "admin");
        assert_eq!(grants.privileges, vec!["INSERT", "SELECT", "UPDATE"]);
        assert!(grants.errors.is_empty());
    }

    #[test]
    fn test_parse_grants_all_letters() {
        let grants = parse_grants("ops=arwdDxtXUCcT/postgres");
        assert_eq!(grants.privileges.len(), 12);
        assert!(grants.errors.is_empty());
    }

    #[test]
    fn test_parse_grants_ignores_grant_option_marker() {
        let grants = parse_grants("bob=r*w*/admin");
        assert_eq!(grants.privileges, vec!["SELECT", "UPDATE"]);
        assert!(grants.errors.is_empty());
    }

    #[test]
    fn test_parse_grants_unknown_letter() {
        let grants = parse_grants("bob=rZ/admin");
        assert_eq!(grants.privileges, vec!["SELECT"]);
        assert_eq!(
            grants.errors,
            vec![Fragment::error(
                "-- Error, found permission character we haven't coded for: Z"
            )]
        );
    }

    #[test]
    fn test_missing_from() {
        let a = parse_grants("bob=arw/admin");
        let b = parse_grants("bob=rd/admin");
        assert_eq!(a.missing_from(&b), vec!["INSERT", "UPDATE"]);
        assert_eq!(b.missing_from(&a), vec!["DELETE"]);
        assert!(a.missing_from(&a).is_empty());
    }
}
