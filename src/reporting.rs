//! Rendering and writing of snapshot reports.
//!
//! JSON and YAML carry the full snapshot. The table is a terminal view with one
//! row per file and a totals row; it drops line texts and the tree.

use crate::cli::OutputFormat;
use crate::error::{CoverageError, Result};
use crate::model::{DiffState, FileRecord, Snapshot};
use crate::summary::percent;
use prettytable::{format, Attr, Cell, Row, Table};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Output path meaning "write to stdout".
pub const STDOUT_PATH: &str = "-";

/// Serializes `snapshot` in the requested format.
///
/// # Errors
///
/// Returns a [`CoverageError::ConfigError`] if serialization fails.
pub fn render_report(snapshot: &Snapshot, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(snapshot)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(snapshot)?),
        OutputFormat::Table => Ok(render_table(snapshot)),
    }
}

/// Renders and writes the report to `output`, or to stdout when it is `-`.
///
/// # Errors
///
/// Fails if rendering fails or the output cannot be written.
pub fn write_report(snapshot: &Snapshot, format: OutputFormat, output: &Path) -> Result<()> {
    let rendered = render_report(snapshot, format)?;

    if output == Path::new(STDOUT_PATH) {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", rendered.trim_end())?;
        return Ok(());
    }

    fs::write(output, rendered)
        .map_err(|e| CoverageError::io_error_with_source("write report", output.to_path_buf(), e))?;
    tracing::info!(path = %output.display(), "Report written");
    Ok(())
}

/// Renders the per-file table.
///
/// Diff-mode snapshots get two extra columns with each file's newly covered
/// and newly uncovered line counts.
#[must_use]
pub fn render_table(snapshot: &Snapshot) -> String {
    let mut table = Table::new();
    table.set_format(
        format::FormatBuilder::new()
            .column_separator('│')
            .borders('│')
            .separators(
                &[format::LinePosition::Top],
                format::LineSeparator::new('─', '┬', '┌', '┐'),
            )
            .separators(
                &[format::LinePosition::Title],
                format::LineSeparator::new('═', '╪', '╞', '╡'),
            )
            .separators(
                &[format::LinePosition::Bottom],
                format::LineSeparator::new('─', '┴', '└', '┘'),
            )
            .padding(1, 1)
            .build(),
    );

    let mut titles = vec!["File", "Covered", "Total", "Percent"];
    if snapshot.is_diff_mode {
        titles.extend(["+New", "-Lost"]);
    }
    table.set_titles(Row::new(
        titles
            .into_iter()
            .map(|t| Cell::new(t).with_style(Attr::Bold))
            .collect(),
    ));

    for file in &snapshot.files {
        let covered = file.covered_lines();
        let total = file.instrumented_lines();
        let mut cells = vec![
            Cell::new(&file.path),
            Cell::new(&covered.to_string()),
            Cell::new(&total.to_string()),
            Cell::new(&format!("{:.1}%", percent(covered, total))),
        ];
        if snapshot.is_diff_mode {
            cells.extend(diff_cells(file));
        }
        table.add_row(Row::new(cells));
    }

    let summary = &snapshot.summary;
    let mut totals = vec![
        Cell::new("TOTAL").with_style(Attr::Bold),
        Cell::new(&summary.covered_lines.to_string()),
        Cell::new(&summary.total_lines.to_string()),
        Cell::new(&format!("{:.1}%", summary.percent)).with_style(Attr::Bold),
    ];
    if let Some(ds) = snapshot.diff_summary.filter(|_| snapshot.is_diff_mode) {
        totals.push(Cell::new(&format!("+{}", ds.newly_covered_lines)));
        totals.push(Cell::new(&format!("-{}", ds.newly_uncovered_lines)));
    }
    table.add_row(Row::new(totals));

    table.to_string()
}

fn diff_cells(file: &FileRecord) -> [Cell; 2] {
    [
        Cell::new(&format!("+{}", file.count_diff_state(DiffState::NewlyCovered))),
        Cell::new(&format!("-{}", file.count_diff_state(DiffState::NewlyUncovered))),
    ]
}

/// Human-readable summary for stderr: one line, or two in diff mode.
///
/// # Example
///
/// ```rust
/// use covtree_core::model::Snapshot;
/// use covtree_core::reporting::render_summary_lines;
///
/// let lines = render_summary_lines(&Snapshot::empty());
/// assert_eq!(lines, vec!["Coverage: 0.0% (0/0 lines)".to_string()]);
/// ```
#[must_use]
pub fn render_summary_lines(snapshot: &Snapshot) -> Vec<String> {
    let summary = &snapshot.summary;
    match snapshot.diff_summary.filter(|_| snapshot.is_diff_mode) {
        Some(ds) => vec![
            format!(
                "Coverage: {:.1}% (Δ{:+.1}% from base)",
                summary.percent, ds.delta_percent
            ),
            format!(
                "Changes: +{} newly covered, -{} regressions",
                ds.newly_covered_lines, ds.newly_uncovered_lines
            ),
        ],
        None => vec![format!(
            "Coverage: {:.1}% ({}/{} lines)",
            summary.percent, summary.covered_lines, summary.total_lines
        )],
    }
}
