//! Output fragments and the classifier that decides where each one is printed.
//!
//! Every comparator emits an ordered list of [`Fragment`]s. A fragment is
//! executable SQL (`Line`), an advisory comment (`Notice`) or a diagnostic
//! (`Error`). [`write_fragments`] filters them through an [`OutputSet`] mask:
//! errors always go to the error sink and reach the primary sink only when the
//! mask asks for them, so the primary output stays executable by default.

use std::fmt;
use std::io::Write;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use serde::Serialize;

use crate::error::{PgDeltaError, Result};

/// One tagged unit of output text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "class", content = "text", rename_all = "lowercase")]
pub enum Fragment {
    /// An executable SQL statement.
    Line(String),
    /// An advisory comment, not meant for execution.
    Notice(String),
    /// A diagnostic produced while diffing.
    Error(String),
}

impl Fragment {
    pub fn line(text: impl Into<String>) -> Self {
        Fragment::Line(text.into())
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Fragment::Notice(text.into())
    }

    pub fn error(text: impl Into<String>) -> Self {
        Fragment::Error(text.into())
    }

    /// The rendered text of the fragment.
    pub fn text(&self) -> &str {
        match self {
            Fragment::Line(s) | Fragment::Notice(s) | Fragment::Error(s) => s,
        }
    }

    /// The single-bit output class this fragment belongs to.
    pub fn class(&self) -> OutputSet {
        match self {
            Fragment::Line(_) => OutputSet::LINE,
            Fragment::Notice(_) => OutputSet::NOTICE,
            Fragment::Error(_) => OutputSet::ERROR,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Fragment::Error(_))
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Bitmask selecting which fragment classes reach the primary output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputSet(u8);

/// Canonical names in rendering order.
const OUTPUT_NAMES: [(OutputSet, &str); 3] = [
    (OutputSet::LINE, "line"),
    (OutputSet::NOTICE, "notice"),
    (OutputSet::ERROR, "error"),
];

impl OutputSet {
    pub const NONE: OutputSet = OutputSet(0);
    pub const LINE: OutputSet = OutputSet(1);
    pub const NOTICE: OutputSet = OutputSet(1 << 1);
    pub const ERROR: OutputSet = OutputSet(1 << 2);
    pub const ALL: OutputSet = OutputSet(0b111);

    /// True when every bit of `other` is set in `self`.
    pub fn contains(self, other: OutputSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Build a mask from class names such as `["line", "notice"]`.
    ///
    /// Every unknown name is collected into one error: `invalid output type: a|b`.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = OutputSet::NONE;
        let mut invalid = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            match OUTPUT_NAMES.iter().find(|(_, n)| *n == name) {
                Some((bit, _)) => set |= *bit,
                None => invalid.push(name.to_string()),
            }
        }
        if !invalid.is_empty() {
            return Err(PgDeltaError::ConfigError(format!(
                "invalid output type: {}",
                invalid.join("|")
            )));
        }
        Ok(set)
    }

    /// Names of the enabled classes, in canonical order.
    pub fn names(self) -> Vec<&'static str> {
        OUTPUT_NAMES
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl Default for OutputSet {
    fn default() -> Self {
        OutputSet::LINE | OutputSet::NOTICE
    }
}

impl BitOr for OutputSet {
    type Output = OutputSet;

    fn bitor(self, rhs: OutputSet) -> OutputSet {
        OutputSet(self.0 | rhs.0)
    }
}

impl BitOrAssign for OutputSet {
    fn bitor_assign(&mut self, rhs: OutputSet) {
        self.0 |= rhs.0;
    }
}

impl FromStr for OutputSet {
    type Err = PgDeltaError;

    /// Accepts `line|notice` as well as `line,notice`.
    fn from_str(s: &str) -> Result<Self> {
        OutputSet::from_names(s.split(['|', ',']).filter(|part| !part.trim().is_empty()))
    }
}

impl fmt::Display for OutputSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join("|"))
    }
}

/// Print fragments according to `mask`.
///
/// `Error` fragments are always written to `err`, and to `out` only when the
/// mask includes [`OutputSet::ERROR`]. `Line` and `Notice` fragments are written
/// to `out` when their bit is set.
pub fn write_fragments<W, E>(
    fragments: &[Fragment],
    mask: OutputSet,
    out: &mut W,
    err: &mut E,
) -> std::io::Result<()>
where
    W: Write,
    E: Write,
{
    for fragment in fragments {
        if fragment.is_error() {
            writeln!(err, "{}", fragment)?;
        }
        if mask.contains(fragment.class()) {
            writeln!(out, "{}", fragment)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Fragment> {
        vec![
            Fragment::notice("-- header"),
            Fragment::line("DROP TABLE public.t;"),
            Fragment::error("-- Error, bad acl"),
        ]
    }

    fn render(mask: OutputSet) -> (String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        write_fragments(&sample(), mask, &mut out, &mut err).unwrap();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_default_mask_is_line_and_notice() {
        let mask = OutputSet::default();
        assert!(mask.contains(OutputSet::LINE));
        assert!(mask.contains(OutputSet::NOTICE));
        assert!(!mask.contains(OutputSet::ERROR));
        assert_eq!(mask.to_string(), "line|notice");
    }

    #[test]
    fn test_errors_always_reach_error_sink() {
        let (out, err) = render(OutputSet::default());
        assert_eq!(out, "-- header\nDROP TABLE public.t;\n");
        assert_eq!(err, "-- Error, bad acl\n");
    }

    #[test]
    fn test_error_bit_duplicates_to_primary() {
        let (out, err) = render(OutputSet::LINE | OutputSet::ERROR);
        assert_eq!(out, "DROP TABLE public.t;\n-- Error, bad acl\n");
        assert_eq!(err, "-- Error, bad acl\n");
    }

    #[test]
    fn test_empty_mask_prints_only_errors_to_error_sink() {
        let (out, err) = render(OutputSet::NONE);
        assert!(out.is_empty());
        assert_eq!(err, "-- Error, bad acl\n");
    }

    #[test]
    fn test_parse_output_set() {
        let set: OutputSet = "line|error".parse().unwrap();
        assert_eq!(set, OutputSet::LINE | OutputSet::ERROR);
        let set: OutputSet = "notice, line".parse().unwrap();
        assert_eq!(set, OutputSet::default());
        assert_eq!(
            "error|notice|line".parse::<OutputSet>().unwrap().to_string(),
            "line|notice|error"
        );
    }

    #[test]
    fn test_parse_output_set_rejects_unknown_names() {
        let err = OutputSet::from_names(["line", "sql", "warn"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: invalid output type: sql|warn"
        );
    }

    #[test]
    fn test_fragment_serializes_with_class_tag() {
        let json = serde_json::to_string(&Fragment::notice("-- hi")).unwrap();
        assert_eq!(json, r#"{"class":"notice","text":"-- hi"}"#);
    }
}
