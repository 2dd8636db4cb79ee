//! Terminal output for pgdelta commands.
//! The SQL script goes to stdout untouched; tables and summaries are styled
//! with comfy-table and colored and go to stderr unless they are the command's
//! whole output.

use std::io::{self, Write};

use colored::Colorize;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use pgdelta_core::compare::{KindSummary, ObjectKind};
use pgdelta_core::output::write_fragments;
use pgdelta_core::{CompareReport, Fragment, OutputSet};

/// Print the script through the output mask. Errors also reach stderr.
pub fn print_script(report: &CompareReport, mask: OutputSet) -> io::Result<()> {
    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut out = stdout.lock();
    let mut err = stderr.lock();
    write_fragments(&report.fragments, mask, &mut out, &mut err)?;
    out.flush()
}

/// Write only the error fragments to `err`, whatever the mask says.
pub fn write_errors<E: Write>(fragments: &[Fragment], err: &mut E) -> io::Result<()> {
    write_fragments(fragments, OutputSet::NONE, &mut io::sink(), err)
}

/// The report as `--json` prints it: fragments outside the mask are left out.
pub fn masked_report(report: &CompareReport, mask: OutputSet) -> CompareReport {
    CompareReport {
        fragments: report
            .fragments
            .iter()
            .filter(|f| mask.contains(f.class()))
            .cloned()
            .collect(),
        summaries: report.summaries.clone(),
    }
}

fn styled_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.into_iter().map(Cell::new).collect::<Vec<_>>());
    table
}

fn count_cell(n: usize) -> Cell {
    Cell::new(n).set_alignment(CellAlignment::Right)
}

/// Render the per-kind counters.
pub fn render_summary(summaries: &[KindSummary]) -> String {
    let mut table = styled_table(vec!["Kind", "Only in db1", "Only in db2", "In both"]);
    for s in summaries {
        table.add_row(vec![
            Cell::new(s.kind.name()),
            count_cell(s.added),
            count_cell(s.dropped),
            count_cell(s.changed),
        ]);
    }
    table.to_string()
}

/// Print the per-kind counter table and a one-line verdict to stderr.
pub fn print_summary(report: &CompareReport) {
    if report.summaries.is_empty() {
        return;
    }
    eprintln!("{}", render_summary(&report.summaries));

    let errors = report.error_count();
    if errors > 0 {
        eprintln!("{}", verdict(errors).red().bold());
    } else {
        eprintln!("{}", verdict(errors).green());
    }
}

/// One-line closing verdict. Error fragments are printed to stderr whatever
/// the mask, so that is where the message points.
fn verdict(errors: usize) -> String {
    match errors {
        0 => "Comparison finished without errors.".to_string(),
        n => format!("{} diagnostic(s) reported; see stderr.", n),
    }
}

/// Render the list of supported kinds.
pub fn render_kinds() -> String {
    let mut table = styled_table(vec!["Kind", "In ALL", "Scope", "Compares"]);
    for kind in ObjectKind::ALL_KINDS {
        let in_all = if kind.in_all() {
            "yes".green().to_string()
        } else {
            "no".dimmed().to_string()
        };
        let scope = if kind.is_database_wide() {
            "database"
        } else {
            "schema"
        };
        table.add_row(vec![
            Cell::new(kind.name()),
            Cell::new(in_all),
            Cell::new(scope),
            Cell::new(kind.description()),
        ]);
    }
    table.to_string()
}

pub fn print_kinds() {
    println!("{}", render_kinds());
}
