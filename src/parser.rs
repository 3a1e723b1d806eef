//! Coverage profile to [`Snapshot`] conversion.
//!
//! For each file group in the profile the parser maps the file identifier
//! back onto the source tree, reads the source, and folds the file's blocks
//! into one [`LineCoverage`] per line. Files that cannot be found on disk are
//! skipped so a single stale entry does not sink the whole report.

use crate::error::Result;
use crate::manifest::detect_module_path;
use crate::model::{FileRecord, LineCoverage, Snapshot};
use crate::profile::{ProfileBlock, parse_profiles};
use std::fs;
use std::io;
use std::path::Path;

/// Parses the profile at `profile_path` against the sources under `src_root`.
///
/// Records receive sequential ids in profile order, counting only files that
/// were actually read.
///
/// # Errors
///
/// Fails if the profile is malformed or unreadable, or if the module
/// identifier cannot be resolved from the manifest. Unreadable source files
/// are logged and omitted.
#[tracing::instrument(level = "info", skip_all, fields(profile = %profile_path.display(), src_root = %src_root.display()))]
pub fn parse(profile_path: &Path, src_root: &Path) -> Result<Snapshot> {
    let profiles = parse_profiles(profile_path)?;
    let module_path = detect_module_path(src_root)?;

    let mut files = Vec::with_capacity(profiles.len());
    for profile in &profiles {
        let Some((rel_path, lines)) = resolve_source(&profile.file_name, &module_path, src_root)
        else {
            tracing::warn!(file = %profile.file_name, "Skipping profile entry with no readable source file");
            continue;
        };

        let coverage = compute_line_coverage(lines.len(), &profile.blocks);
        files.push(FileRecord {
            id: files.len(),
            path: rel_path,
            lines,
            coverage,
            diff_state: None,
        });
    }

    tracing::info!(
        profile_entries = profiles.len(),
        files = files.len(),
        "Parsed coverage profile"
    );
    let snapshot = Snapshot::from_files(files);
    tracing::debug!(tree = %snapshot.tree, "Built file tree");
    Ok(snapshot)
}

/// Maps a profile file identifier to a root-relative path and reads it.
///
/// The module prefix is stripped first. If that path is unreadable, the part
/// of the identifier after its third `/` is tried instead, which covers
/// profiles recorded with a different module depth. Returns `None` when
/// neither candidate can be read.
pub fn resolve_source(
    file_name: &str,
    module_path: &str,
    src_root: &Path,
) -> Option<(String, Vec<String>)> {
    let primary = file_name
        .strip_prefix(module_path)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(file_name);

    match read_lines(&src_root.join(primary)) {
        Ok(lines) => return Some((primary.to_string(), lines)),
        Err(e) => {
            tracing::debug!(file = %file_name, candidate = %primary, error = %e, "Primary source path unreadable");
        }
    }

    let alternate = file_name.splitn(4, '/').nth(3)?;
    match read_lines(&src_root.join(alternate)) {
        Ok(lines) => {
            tracing::debug!(file = %file_name, candidate = %alternate, "Resolved source via alternate path");
            Some((alternate.to_string(), lines))
        }
        Err(e) => {
            tracing::debug!(file = %file_name, candidate = %alternate, error = %e, "Alternate source path unreadable");
            None
        }
    }
}

/// Reads a source file as lines, decoding invalid UTF-8 lossily and dropping `\r` line endings.
///
/// # Errors
///
/// Returns the IO error if the file cannot be read.
pub fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect())
}

/// Folds coverage blocks into one classification per line.
///
/// A line touched by a block with statements that executed is covered; a line
/// touched only by blocks with statements that never executed is uncovered;
/// every other line has no statement. Covered is never downgraded. Block
/// ranges past the end of the file are clipped.
#[must_use]
pub fn compute_line_coverage(line_count: usize, blocks: &[ProfileBlock]) -> Vec<LineCoverage> {
    let mut coverage = vec![LineCoverage::NoStatement; line_count];

    for block in blocks.iter().filter(|b| b.num_stmt > 0) {
        let start = block.start_line.max(1);
        let end = block.end_line.min(line_count);
        for line in start..=end {
            let slot = &mut coverage[line - 1];
            if block.count > 0 {
                *slot = LineCoverage::Covered;
            } else if *slot == LineCoverage::NoStatement {
                *slot = LineCoverage::Uncovered;
            }
        }
    }
    coverage
}
