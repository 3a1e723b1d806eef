//! Aggregate line statistics.

use crate::model::{FileRecord, Summary};

/// Computes total/covered instrumented lines and the covered percentage.
///
/// Lines classified as no-statement are not counted. With no instrumented
/// lines the percentage is exactly `0.0`.
#[must_use]
pub fn compute_summary(files: &[FileRecord]) -> Summary {
    let (total_lines, covered_lines) = files.iter().fold((0, 0), |(total, covered), file| {
        (
            total + file.instrumented_lines(),
            covered + file.covered_lines(),
        )
    });
    Summary {
        total_lines,
        covered_lines,
        percent: percent(covered_lines, total_lines),
    }
}

/// `covered / total * 100`, or `0.0` when `total` is zero.
#[must_use]
pub fn percent(covered: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64 * 100.0
    }
}
