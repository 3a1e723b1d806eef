//! Report model produced by the coverage pipeline.
//!
//! A [`Snapshot`] is the complete derived state for one coverage measurement
//! (or one base/current comparison). It is built once, never mutated, and
//! serializes to the JSON shape consumed by renderers and badge generators:
//!
//! ```json
//! {
//!   "files": [{ "id": 0, "path": "a.go", "lines": ["..."], "coverage": [0, 2], "diffState": [0, 1] }],
//!   "tree": { "name": ".", "type": "dir", "children": [{ "name": "a.go", "type": "file", "fileId": 0 }] },
//!   "summary": { "totalLines": 1, "coveredLines": 1, "percent": 100.0 },
//!   "diffSummary": { "newlyCoveredLines": 1, "newlyUncoveredLines": 0, "deltaPercent": 100.0, "basePercent": 0.0 },
//!   "isDiffMode": true
//! }
//! ```

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coverage classification of a single source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineCoverage {
    /// No instrumented statement touches the line.
    #[default]
    NoStatement,
    /// Instrumented, never executed.
    Uncovered,
    /// Instrumented and executed at least once.
    Covered,
}

impl LineCoverage {
    /// Wire code used in the report JSON.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::NoStatement => 0,
            Self::Uncovered => 1,
            Self::Covered => 2,
        }
    }

    /// Inverse of [`LineCoverage::code`].
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::NoStatement),
            1 => Some(Self::Uncovered),
            2 => Some(Self::Covered),
            _ => None,
        }
    }

    /// Whether the line carries at least one statement.
    #[must_use]
    pub const fn is_instrumented(self) -> bool {
        !matches!(self, Self::NoStatement)
    }
}

/// Per-line outcome of comparing a base measurement with a current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiffState {
    /// Nothing worth highlighting.
    #[default]
    NoChange,
    /// Uncovered (or absent) in base, covered now.
    NewlyCovered,
    /// Covered (or absent) in base, uncovered now.
    NewlyUncovered,
    /// Covered in both.
    UnchangedCovered,
    /// Uncovered in both.
    UnchangedUncovered,
}

impl DiffState {
    /// Wire code used in the report JSON.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::NoChange => 0,
            Self::NewlyCovered => 1,
            Self::NewlyUncovered => 2,
            Self::UnchangedCovered => 3,
            Self::UnchangedUncovered => 4,
        }
    }

    /// Inverse of [`DiffState::code`].
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::NoChange),
            1 => Some(Self::NewlyCovered),
            2 => Some(Self::NewlyUncovered),
            3 => Some(Self::UnchangedCovered),
            4 => Some(Self::UnchangedUncovered),
            _ => None,
        }
    }
}

macro_rules! impl_code_serde {
    ($ty:ident, $what:literal) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u8(self.code())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let code = u8::deserialize(deserializer)?;
                $ty::from_code(code).ok_or_else(|| {
                    de::Error::invalid_value(de::Unexpected::Unsigned(code.into()), &$what)
                })
            }
        }
    };
}

impl_code_serde!(LineCoverage, "a line coverage code between 0 and 2");
impl_code_serde!(DiffState, "a diff state code between 0 and 4");

/// One source file with its per-line classification.
///
/// `lines`, `coverage` and (when present) `diff_state` always have the same length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Index of this record in its snapshot's file list.
    pub id: usize,
    /// Source-root-relative path with `/` separators.
    pub path: String,
    /// Source text, one entry per line.
    pub lines: Vec<String>,
    /// Classification, one entry per line.
    pub coverage: Vec<LineCoverage>,
    /// Diff classification, one entry per line; only set in diff mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_state: Option<Vec<DiffState>>,
}

impl FileRecord {
    /// Number of instrumented lines in this file.
    #[must_use]
    pub fn instrumented_lines(&self) -> usize {
        self.coverage.iter().filter(|c| c.is_instrumented()).count()
    }

    /// Number of covered lines in this file.
    #[must_use]
    pub fn covered_lines(&self) -> usize {
        self.coverage
            .iter()
            .filter(|c| **c == LineCoverage::Covered)
            .count()
    }

    /// Number of lines in the given diff state; zero outside diff mode.
    #[must_use]
    pub fn count_diff_state(&self, state: DiffState) -> usize {
        self.diff_state
            .as_ref()
            .map_or(0, |states| states.iter().filter(|s| **s == state).count())
    }
}

/// A node of the directory/file tree.
///
/// File nodes refer to their record by index into [`Snapshot::files`]; the
/// tree never owns file data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TreeNode {
    /// A directory and its sorted children.
    #[serde(rename = "dir")]
    Directory {
        /// Path segment name (`.` for the root).
        name: String,
        /// Directories first, then files, each group sorted by name.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<TreeNode>,
    },
    /// A leaf pointing at a file record.
    #[serde(rename = "file")]
    File {
        /// File name.
        name: String,
        /// Index into the owning snapshot's file list.
        #[serde(rename = "fileId")]
        file_id: usize,
    },
}

impl TreeNode {
    /// An empty root directory.
    #[must_use]
    pub fn root() -> Self {
        Self::Directory {
            name: ".".to_string(),
            children: Vec::new(),
        }
    }

    /// The node's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Directory { name, .. } | Self::File { name, .. } => name,
        }
    }

    /// Whether this node is a directory.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }

    /// Children of a directory; empty for files.
    #[must_use]
    pub fn children(&self) -> &[TreeNode] {
        match self {
            Self::Directory { children, .. } => children,
            Self::File { .. } => &[],
        }
    }

    /// File ids of every leaf below this node, in tree order.
    #[must_use]
    pub fn file_ids(&self) -> Vec<usize> {
        let mut ids = Vec::new();
        self.collect_file_ids(&mut ids);
        ids
    }

    fn collect_file_ids(&self, out: &mut Vec<usize>) {
        match self {
            Self::File { file_id, .. } => out.push(*file_id),
            Self::Directory { children, .. } => {
                for child in children {
                    child.collect_file_ids(out);
                }
            }
        }
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn walk(node: &TreeNode, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let indent = "  ".repeat(depth);
            match node {
                TreeNode::Directory { name, children } => {
                    writeln!(f, "{indent}{name}/")?;
                    for child in children {
                        walk(child, depth + 1, f)?;
                    }
                    Ok(())
                }
                TreeNode::File { name, file_id } => writeln!(f, "{indent}{name} #{file_id}"),
            }
        }
        walk(self, 0, f)
    }
}

/// Aggregate line counts for a set of files.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Lines with at least one statement.
    pub total_lines: usize,
    /// Instrumented lines that executed.
    pub covered_lines: usize,
    /// `covered_lines / total_lines * 100`, or exactly 0 when there are no instrumented lines.
    pub percent: f64,
}

/// Totals of a base/current comparison.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    /// Lines in [`DiffState::NewlyCovered`].
    pub newly_covered_lines: usize,
    /// Lines in [`DiffState::NewlyUncovered`].
    pub newly_uncovered_lines: usize,
    /// Current percent minus base percent.
    pub delta_percent: f64,
    /// Base percent.
    pub base_percent: f64,
}

/// Complete report state for one measurement or comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// File records, `files[i].id == i`.
    pub files: Vec<FileRecord>,
    /// Directory tree over `files`.
    pub tree: TreeNode,
    /// Aggregate over `files`.
    pub summary: Summary,
    /// Comparison totals; only set in diff mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<DiffSummary>,
    /// Whether `files` carry diff states.
    pub is_diff_mode: bool,
}

impl Snapshot {
    /// Builds a non-diff snapshot from records, renumbering ids and deriving
    /// the tree and summary from them.
    #[must_use]
    pub fn from_files(files: Vec<FileRecord>) -> Self {
        let files = renumber(files);
        let tree = crate::tree::build_tree(&files);
        let summary = crate::summary::compute_summary(&files);
        Self {
            files,
            tree,
            summary,
            diff_summary: None,
            is_diff_mode: false,
        }
    }

    /// A snapshot with no files.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_files(Vec::new())
    }

    /// Looks a record up by path.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&FileRecord> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Whether the snapshot holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Assigns ids `0..n` in list order.
pub(crate) fn renumber(mut files: Vec<FileRecord>) -> Vec<FileRecord> {
    for (id, file) in files.iter_mut().enumerate() {
        file.id = id;
    }
    files
}
