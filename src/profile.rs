//! Block-format coverage profile reader.
//!
//! A profile starts with a mode declaration and then lists one instrumented
//! block per line:
//!
//! ```text
//! mode: set
//! example.com/m/pkg/file.go:3.14,5.2 2 1
//! ```
//!
//! Records are grouped by file identifier. Groups come back sorted by
//! identifier, blocks within a group by start position, and blocks that
//! describe the same source range are merged.

use crate::error::{CoverageError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// How execution counts were recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverMode {
    /// Counts are 0 or 1.
    Set,
    /// Counts are execution tallies.
    Count,
    /// Like `Count`, collected with atomic increments.
    Atomic,
}

impl FromStr for CoverMode {
    type Err = CoverageError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "set" => Ok(Self::Set),
            "count" => Ok(Self::Count),
            "atomic" => Ok(Self::Atomic),
            other => Err(CoverageError::profile_error_at(
                1,
                format!("unknown coverage mode '{}'", other),
            )),
        }
    }
}

impl fmt::Display for CoverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Set => "set",
            Self::Count => "count",
            Self::Atomic => "atomic",
        })
    }
}

/// A single instrumented source range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileBlock {
    /// 1-based first line.
    pub start_line: usize,
    /// 1-based first column.
    pub start_col: usize,
    /// 1-based last line, inclusive.
    pub end_line: usize,
    /// 1-based column after the block.
    pub end_col: usize,
    /// Statements inside the block.
    pub num_stmt: u64,
    /// How often the block executed.
    pub count: u64,
}

impl ProfileBlock {
    fn same_range(&self, other: &Self) -> bool {
        self.start_line == other.start_line
            && self.start_col == other.start_col
            && self.end_line == other.end_line
            && self.end_col == other.end_col
    }
}

/// All blocks recorded for one file identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// File identifier as written in the profile.
    pub file_name: String,
    /// Mode declared on the first line.
    pub mode: CoverMode,
    /// Blocks sorted by start position, duplicates merged.
    pub blocks: Vec<ProfileBlock>,
}

/// Reads and parses the profile at `path`.
///
/// # Errors
///
/// Returns an `IoError` if the file cannot be read and a `ProfileError` naming
/// the file and line if its content is malformed.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn parse_profiles(path: &Path) -> Result<Vec<Profile>> {
    let content = fs::read_to_string(path).map_err(|e| {
        CoverageError::io_error_with_source("read coverage profile", path.to_path_buf(), e)
    })?;
    parse_profiles_from_str(&content).map_err(|e| e.with_profile_file(path.to_path_buf()))
}

/// Parses profile text.
///
/// # Errors
///
/// Returns a `ProfileError` when the mode line is missing, a record does not
/// match `file:sl.sc,el.ec stmts count`, or two records for the same range
/// disagree on their statement count.
pub fn parse_profiles_from_str(content: &str) -> Result<Vec<Profile>> {
    let mut lines = content.lines().enumerate();

    let mode = loop {
        match lines.next() {
            Some((_, line)) if line.trim().is_empty() => continue,
            Some((idx, line)) => break parse_mode_line(idx + 1, line)?,
            None => return Err(CoverageError::profile_error("profile is empty")),
        }
    };

    tracing::debug!(mode = %mode, "Read profile mode");

    let mut grouped: BTreeMap<String, Vec<ProfileBlock>> = BTreeMap::new();
    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let (file_name, block) = parse_record(idx + 1, line.trim_end())?;
        grouped.entry(file_name.to_string()).or_default().push(block);
    }

    grouped
        .into_iter()
        .map(|(file_name, blocks)| {
            let blocks = merge_blocks(&file_name, mode, blocks)?;
            Ok(Profile {
                file_name,
                mode,
                blocks,
            })
        })
        .collect()
}

fn parse_mode_line(line_no: usize, line: &str) -> Result<CoverMode> {
    let mode = line
        .trim_end()
        .strip_prefix("mode: ")
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| {
            CoverageError::profile_error_at(line_no, format!("bad mode line: {:?}", line))
        })?;
    mode.parse()
        .map_err(|_| CoverageError::profile_error_at(line_no, format!("unknown mode '{}'", mode)))
}

/// Splits `file:sl.sc,el.ec stmts count` into its file identifier and block.
fn parse_record(line_no: usize, line: &str) -> Result<(&str, ProfileBlock)> {
    let malformed = |what: &str| {
        CoverageError::profile_error_at(
            line_no,
            format!("{} in record {:?}; expected file:line.col,line.col stmts count", what, line),
        )
    };

    let (file_name, rest) = line
        .rsplit_once(':')
        .ok_or_else(|| malformed("missing ':' separator"))?;
    if file_name.is_empty() {
        return Err(malformed("empty file identifier"));
    }

    let mut fields = rest.split(' ');
    let (range, num_stmt, count) = match (fields.next(), fields.next(), fields.next(), fields.next())
    {
        (Some(range), Some(num_stmt), Some(count), None) => (range, num_stmt, count),
        _ => return Err(malformed("wrong number of fields")),
    };

    let (start, end) = range
        .split_once(',')
        .ok_or_else(|| malformed("missing ',' in block range"))?;
    let (start_line, start_col) = parse_position(start).ok_or_else(|| malformed("bad start position"))?;
    let (end_line, end_col) = parse_position(end).ok_or_else(|| malformed("bad end position"))?;

    let block = ProfileBlock {
        start_line,
        start_col,
        end_line,
        end_col,
        num_stmt: num_stmt
            .parse()
            .map_err(|_| malformed("bad statement count"))?,
        count: count.parse().map_err(|_| malformed("bad execution count"))?,
    };
    Ok((file_name, block))
}

fn parse_position(s: &str) -> Option<(usize, usize)> {
    let (line, col) = s.split_once('.')?;
    Some((line.parse().ok()?, col.parse().ok()?))
}

fn merge_blocks(
    file_name: &str,
    mode: CoverMode,
    mut blocks: Vec<ProfileBlock>,
) -> Result<Vec<ProfileBlock>> {
    blocks.sort_by_key(|b| (b.start_line, b.start_col));

    let mut merged: Vec<ProfileBlock> = Vec::with_capacity(blocks.len());
    for block in blocks {
        match merged.last_mut() {
            Some(last) if last.same_range(&block) => {
                if last.num_stmt != block.num_stmt {
                    return Err(CoverageError::profile_error(format!(
                        "inconsistent statement count for {}:{}.{},{}.{} ({} vs {})",
                        file_name,
                        block.start_line,
                        block.start_col,
                        block.end_line,
                        block.end_col,
                        last.num_stmt,
                        block.num_stmt
                    )));
                }
                last.count = match mode {
                    CoverMode::Set => last.count | block.count,
                    CoverMode::Count | CoverMode::Atomic => last.count.saturating_add(block.count),
                };
            }
            _ => merged.push(block),
        }
    }
    Ok(merged)
}
