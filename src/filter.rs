//! Subset filters over a snapshot.
//!
//! Both modes return a fresh snapshot: retained records are renumbered
//! `0..n` in their original order, and the tree and summary are rebuilt from
//! the retained records only. An empty result is valid output; whether it is
//! an error is up to the caller.
//!
//! Filtering a diff-mode snapshot keeps the per-line diff states and the
//! base percentage. The newly covered/uncovered totals are recounted over the
//! retained files, and the delta is taken against the rebuilt summary.

use crate::error::{CoverageError, Result};
use crate::model::{DiffState, DiffSummary, FileRecord, Snapshot, renumber};
use crate::summary::compute_summary;
use crate::tree::build_tree;
use regex::Regex;
use std::collections::HashSet;

/// Keeps the files whose path is in `allowed`.
#[must_use]
pub fn filter_by_paths(snapshot: &Snapshot, allowed: &HashSet<String>) -> Snapshot {
    let result = retain(snapshot, |file| allowed.contains(&file.path));
    tracing::debug!(
        allowed = allowed.len(),
        before = snapshot.files.len(),
        after = result.files.len(),
        "Applied allow-set filter"
    );
    result
}

/// Compiles every pattern before any file is examined.
///
/// # Errors
///
/// Returns a [`CoverageError::PatternError`] naming the first pattern that
/// fails to compile.
pub fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            let p = p.as_ref();
            Regex::new(p).map_err(|e| CoverageError::pattern_error(p, e))
        })
        .collect()
}

/// Drops the files whose path matches any of `patterns` (unanchored search).
///
/// # Errors
///
/// Fails without filtering anything if any pattern is invalid.
pub fn filter_by_patterns<S: AsRef<str>>(snapshot: &Snapshot, patterns: &[S]) -> Result<Snapshot> {
    let regexes = compile_patterns(patterns)?;
    Ok(filter_by_regex(snapshot, &regexes))
}

/// Drops the files whose path matches any of the compiled `regexes`.
#[must_use]
pub fn filter_by_regex(snapshot: &Snapshot, regexes: &[Regex]) -> Snapshot {
    let result = retain(snapshot, |file| !regexes.iter().any(|re| re.is_match(&file.path)));
    tracing::debug!(
        patterns = regexes.len(),
        before = snapshot.files.len(),
        after = result.files.len(),
        "Applied exclusion patterns"
    );
    result
}

fn retain<F>(snapshot: &Snapshot, keep: F) -> Snapshot
where
    F: Fn(&FileRecord) -> bool,
{
    let files = renumber(snapshot.files.iter().filter(|&f| keep(f)).cloned().collect());
    let tree = build_tree(&files);
    let summary = compute_summary(&files);

    let diff_summary = snapshot.diff_summary.map(|ds| {
        let count = |state: DiffState| -> usize {
            files.iter().map(|f| f.count_diff_state(state)).sum()
        };
        DiffSummary {
            newly_covered_lines: count(DiffState::NewlyCovered),
            newly_uncovered_lines: count(DiffState::NewlyUncovered),
            delta_percent: summary.percent - ds.base_percent,
            base_percent: ds.base_percent,
        }
    });

    Snapshot {
        files,
        tree,
        summary,
        diff_summary,
        is_diff_mode: snapshot.is_diff_mode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::compute_diff;
    use crate::model::LineCoverage;

    fn file(path: &str, coverage: &[u8]) -> FileRecord {
        FileRecord {
            id: 0,
            path: path.to_string(),
            lines: vec!["x".to_string(); coverage.len()],
            coverage: coverage
                .iter()
                .map(|c| LineCoverage::from_code(*c).unwrap())
                .collect(),
            diff_state: None,
        }
    }

    fn allow(paths: &[&str]) -> HashSet<String> {
        paths.iter().map(|p| (*p).to_string()).collect()
    }

    #[test]
    fn test_filter_by_paths_renumbers_and_recomputes() {
        let snapshot = Snapshot::from_files(vec![file("a.go", &[0, 2, 2]), file("b.go", &[0, 1])]);
        let filtered = filter_by_paths(&snapshot, &allow(&["b.go"]));

        assert_eq!(filtered.files.len(), 1);
        assert_eq!(filtered.files[0].id, 0);
        assert_eq!(filtered.files[0].path, "b.go");
        assert_eq!(filtered.summary.total_lines, 1);
        assert_eq!(filtered.summary.covered_lines, 0);
        assert_eq!(filtered.summary.percent, 0.0);
        assert_eq!(filtered.tree.file_ids(), vec![0]);
    }

    #[test]
    fn test_filter_by_paths_on_empty_snapshot() {
        let filtered = filter_by_paths(&Snapshot::empty(), &allow(&["a.go"]));
        assert!(filtered.is_empty());
        assert_eq!(filtered, Snapshot::empty());
    }

    #[test]
    fn test_filter_by_paths_is_idempotent() {
        let snapshot = Snapshot::from_files(vec![
            file("a.go", &[2]),
            file("pkg/b.go", &[1]),
            file("pkg/c.go", &[2, 1]),
        ]);
        let allowed = allow(&["pkg/b.go", "pkg/c.go"]);
        let once = filter_by_paths(&snapshot, &allowed);
        let twice = filter_by_paths(&once, &allowed);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_by_patterns_excludes_matches() {
        let snapshot = Snapshot::from_files(vec![
            file("parser.go", &[0, 2]),
            file("mock_parser.go", &[0, 1]),
        ]);
        let filtered = filter_by_patterns(&snapshot, &[r"mock_.*\.go$"]).unwrap();
        let paths: Vec<&str> = filtered.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["parser.go"]);
        assert_eq!(filtered.summary.percent, 100.0);
    }

    #[test]
    fn test_filter_by_patterns_empty_list_keeps_everything() {
        let snapshot = Snapshot::from_files(vec![file("a.go", &[2]), file("b.go", &[1])]);
        let filtered = filter_by_patterns::<&str>(&snapshot, &[]).unwrap();
        assert_eq!(filtered, snapshot);
    }

    #[test]
    fn test_invalid_pattern_fails_fast() {
        let snapshot = Snapshot::from_files(vec![file("a.go", &[2])]);
        let err = filter_by_patterns(&snapshot, &["ok", "[unclosed", "also("]).unwrap_err();
        match err {
            CoverageError::PatternError { pattern, .. } => assert_eq!(pattern, "[unclosed"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_excluding_everything_yields_empty_snapshot() {
        let snapshot = Snapshot::from_files(vec![file("a.go", &[2])]);
        let filtered = filter_by_patterns(&snapshot, &[".*"]).unwrap();
        assert!(filtered.is_empty());
        assert_eq!(filtered.summary.total_lines, 0);
    }

    #[test]
    fn test_filter_keeps_diff_states_and_recounts() {
        let base = Snapshot::from_files(vec![file("a.go", &[1]), file("b.go", &[2])]);
        let current = Snapshot::from_files(vec![file("a.go", &[2]), file("b.go", &[1])]);
        let diff = compute_diff(&base, &current);

        let filtered = filter_by_paths(&diff, &allow(&["a.go"]));
        assert!(filtered.is_diff_mode);
        assert_eq!(
            filtered.files[0].diff_state.as_deref(),
            Some(&[DiffState::NewlyCovered][..])
        );
        let ds = filtered.diff_summary.unwrap();
        assert_eq!(ds.newly_covered_lines, 1);
        assert_eq!(ds.newly_uncovered_lines, 0);
        assert_eq!(ds.base_percent, diff.diff_summary.unwrap().base_percent);
    }

    #[test]
    fn test_filter_recomputes_delta_against_base() {
        let base = Snapshot::from_files(vec![file("a.go", &[1]), file("b.go", &[1])]);
        let current = Snapshot::from_files(vec![file("a.go", &[2]), file("b.go", &[1])]);
        let diff = compute_diff(&base, &current);
        assert_eq!(diff.diff_summary.unwrap().delta_percent, 50.0);

        let filtered = filter_by_paths(&diff, &allow(&["a.go"]));
        let ds = filtered.diff_summary.unwrap();
        assert_eq!(filtered.summary.percent, 100.0);
        assert_eq!(ds.base_percent, 0.0);
        assert_eq!(ds.delta_percent, filtered.summary.percent - ds.base_percent);
        assert_eq!(ds.delta_percent, 100.0);
    }
}
