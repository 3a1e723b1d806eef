//! Line-level comparison of two snapshots.
//!
//! Files are matched by path and lines by index. There is no realignment: if
//! lines moved between the two measured revisions, changes are attributed to
//! whatever line now sits at the old index. Callers that need shift-aware
//! diffs have to remap line indices before comparing.

use crate::model::{DiffState, DiffSummary, FileRecord, LineCoverage, Snapshot};
use std::collections::HashMap;

/// Compares `current` against `base` and returns a new diff-mode snapshot.
///
/// The result holds `current`'s files (each with a diff-state sequence),
/// `current`'s tree and summary, and a [`DiffSummary`]. Files only present in
/// `base` do not appear in the output.
#[must_use]
#[tracing::instrument(level = "debug", skip_all, fields(base_files = base.files.len(), current_files = current.files.len()))]
pub fn compute_diff(base: &Snapshot, current: &Snapshot) -> Snapshot {
    let base_by_path: HashMap<&str, &FileRecord> = base
        .files
        .iter()
        .map(|f| (f.path.as_str(), f))
        .collect();

    let mut newly_covered_lines = 0;
    let mut newly_uncovered_lines = 0;

    let files: Vec<FileRecord> = current
        .files
        .iter()
        .map(|file| {
            let base_file = base_by_path.get(file.path.as_str()).copied();
            if base_file.is_none() {
                tracing::debug!(path = %file.path, "File absent from base; every instrumented line counts as changed");
            }
            let states = diff_lines(base_file.map(|b| b.coverage.as_slice()), &file.coverage);
            newly_covered_lines += states.iter().filter(|s| **s == DiffState::NewlyCovered).count();
            newly_uncovered_lines += states
                .iter()
                .filter(|s| **s == DiffState::NewlyUncovered)
                .count();
            FileRecord {
                diff_state: Some(states),
                ..file.clone()
            }
        })
        .collect();

    let diff_summary = DiffSummary {
        newly_covered_lines,
        newly_uncovered_lines,
        delta_percent: current.summary.percent - base.summary.percent,
        base_percent: base.summary.percent,
    };
    tracing::info!(
        newly_covered = newly_covered_lines,
        newly_uncovered = newly_uncovered_lines,
        delta_percent = diff_summary.delta_percent,
        "Computed coverage diff"
    );

    Snapshot {
        files,
        tree: current.tree.clone(),
        summary: current.summary,
        diff_summary: Some(diff_summary),
        is_diff_mode: true,
    }
}

/// Classifies each current line against the base line at the same index.
///
/// `base` is `None` for a file missing from the base snapshot; indices past
/// the end of a shorter base file are likewise treated as absent.
#[must_use]
pub fn diff_lines(base: Option<&[LineCoverage]>, current: &[LineCoverage]) -> Vec<DiffState> {
    current
        .iter()
        .enumerate()
        .map(|(idx, cur)| classify(base.and_then(|b| b.get(idx).copied()), *cur))
        .collect()
}

/// Diff state for one line; `None` means the base has no such line.
#[must_use]
pub const fn classify(base: Option<LineCoverage>, current: LineCoverage) -> DiffState {
    use LineCoverage::{Covered, Uncovered};

    match (base, current) {
        (None | Some(Uncovered), Covered) => DiffState::NewlyCovered,
        (None | Some(Covered), Uncovered) => DiffState::NewlyUncovered,
        (Some(Covered), Covered) => DiffState::UnchangedCovered,
        (Some(Uncovered), Uncovered) => DiffState::UnchangedUncovered,
        (_, LineCoverage::NoStatement) | (Some(LineCoverage::NoStatement), _) => {
            DiffState::NoChange
        }
    }
}
