//! The ordered diff engine.
//!
//! Two sorted sequences of records of one kind are walked in lockstep. Each
//! step compares the current record on both sides:
//!
//! - equal keys: the record exists on both sides, `change` reconciles details
//! - left sorts first: the record is missing on the right, `add` creates it
//! - right sorts first: the record only exists on the right, `drop` removes it
//!
//! Once one side is exhausted the opposite action drains the other side.

use std::cmp::Ordering;

use serde::Serialize;

use crate::output::Fragment;
use crate::row::SchemaSelector;

/// The schema selectors of the side performing an operation and of its partner.
#[derive(Debug, Clone, Copy)]
pub struct Pairing<'a> {
    pub this: &'a SchemaSelector,
    pub partner: &'a SchemaSelector,
}

impl<'a> Pairing<'a> {
    pub fn new(this: &'a SchemaSelector, partner: &'a SchemaSelector) -> Self {
        Self { this, partner }
    }

    /// Schema to qualify DDL with for a row whose own schema is `own`.
    ///
    /// With a wildcard partner the row keeps its own schema; otherwise the
    /// partner's configured schema wins.
    pub fn target_schema(&self, own: &'a str) -> &'a str {
        self.partner.qualify(own)
    }

    /// True when the two sides were configured with different schemas, so
    /// schema names embedded in definitions must be rewritten.
    pub fn cross_schema(&self) -> bool {
        self.this != self.partner
    }

    /// The same pairing seen from the partner's side.
    pub fn flipped(&self) -> Pairing<'a> {
        Pairing::new(self.partner, self.this)
    }
}

/// A typed catalog record that knows how to order itself and how to emit
/// the SQL that reconciles it with a partner database.
pub trait Entity {
    /// Three-way ordering on the comparison key. Plain byte-wise string order.
    fn compare(&self, other: &Self) -> Ordering;

    /// Row-level diagnostic reported every time this record is compared.
    fn check(&self) -> Option<Fragment> {
        None
    }

    /// This record exists only on this side; create it on the partner.
    fn add(&self, pairing: &Pairing<'_>) -> Vec<Fragment>;

    /// This record has no counterpart on the partner; remove it.
    fn drop(&self, pairing: &Pairing<'_>) -> Vec<Fragment>;

    /// Both sides hold a record with the same key; `other` is the partner's.
    fn change(&self, other: &Self, pairing: &Pairing<'_>) -> Vec<Fragment>;
}

/// Cursor over one side's sorted records.
///
/// The position starts before the first record, so [`Cursor::advance`] must be
/// called once before the first comparison.
#[derive(Debug)]
pub struct Cursor<T> {
    rows: Vec<T>,
    position: Option<usize>,
    schema: SchemaSelector,
}

impl<T: Entity> Cursor<T> {
    pub fn new(rows: Vec<T>, schema: SchemaSelector) -> Self {
        Self {
            rows,
            position: None,
            schema,
        }
    }

    /// Move to the next record; false once the records are exhausted.
    pub fn advance(&mut self) -> bool {
        let next = self.position.map_or(0, |p| p + 1).min(self.rows.len());
        self.position = Some(next);
        next < self.rows.len()
    }

    /// The record under the cursor, if any.
    pub fn current(&self) -> Option<&T> {
        self.position.and_then(|p| self.rows.get(p))
    }

    /// Order this cursor's current record against `other`'s.
    ///
    /// An exhausted cursor sorts before a positioned one. The second value is
    /// the current record's diagnostic, if it has one.
    pub fn compare_to(&self, other: &Cursor<T>) -> (Ordering, Option<Fragment>) {
        let diagnostic = self.current().and_then(Entity::check);
        let ordering = match (self.current(), other.current()) {
            (Some(a), Some(b)) => a.compare(b),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        (ordering, diagnostic)
    }

    pub fn add(&self, partner: &Cursor<T>) -> Vec<Fragment> {
        self.current()
            .map(|row| row.add(&Pairing::new(&self.schema, &partner.schema)))
            .unwrap_or_default()
    }

    pub fn drop(&self, partner: &Cursor<T>) -> Vec<Fragment> {
        self.current()
            .map(|row| row.drop(&Pairing::new(&self.schema, &partner.schema)))
            .unwrap_or_default()
    }

    pub fn change(&self, partner: &Cursor<T>) -> Vec<Fragment> {
        match (self.current(), partner.current()) {
            (Some(row), Some(other)) => {
                row.change(other, &Pairing::new(&self.schema, &partner.schema))
            }
            _ => Vec::new(),
        }
    }
}

/// Result of one diff run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    /// Emitted fragments, in order.
    pub fragments: Vec<Fragment>,
    /// Records present only on the left.
    pub added: usize,
    /// Records present only on the right.
    pub dropped: usize,
    /// Records present on both sides (whether or not they differ).
    pub changed: usize,
}

impl DiffReport {
    /// Number of records visited across both sides: matches count twice.
    pub fn rows_visited(&self) -> usize {
        self.added + self.dropped + 2 * self.changed
    }
}

/// Merge-join two sorted cursors of the same kind.
///
/// `left` is the desired state (db1), `right` the database to be altered
/// (db2). Both must be sorted by [`Entity::compare`].
pub fn diff<T: Entity>(mut left: Cursor<T>, mut right: Cursor<T>) -> DiffReport {
    let mut report = DiffReport::default();
    let mut more_left = left.advance();
    let mut more_right = right.advance();

    while more_left || more_right {
        let (ordering, diagnostic) = left.compare_to(&right);
        report.fragments.extend(diagnostic);

        let emitted = match ordering {
            Ordering::Equal => {
                report.changed += 1;
                let out = left.change(&right);
                more_left = left.advance();
                more_right = right.advance();
                out
            }
            Ordering::Less if more_left => {
                report.added += 1;
                let out = left.add(&right);
                more_left = left.advance();
                out
            }
            Ordering::Less => {
                // Left is exhausted: drain the right tail.
                report.dropped += 1;
                let out = right.drop(&left);
                more_right = right.advance();
                out
            }
            Ordering::Greater if more_right => {
                report.dropped += 1;
                let out = right.drop(&left);
                more_right = right.advance();
                out
            }
            Ordering::Greater => {
                // Right is exhausted: drain the left tail.
                report.added += 1;
                let out = left.add(&right);
                more_left = left.advance();
                out
            }
        };
        report.fragments.extend(emitted);
    }

    log::debug!(
        "Diff run finished; added={}, dropped={}, changed={}, fragments={}",
        report.added,
        report.dropped,
        report.changed,
        report.fragments.len()
    );
    report
}
