//! # covtree - Go coverage profiles as a report model
//!
//! covtree turns a Go block-format coverage profile plus the source tree it
//! was measured on into a [`Snapshot`]: one classification per source line, a
//! deterministic directory tree, and aggregate totals. Two snapshots can be
//! compared line by line, and a snapshot can be narrowed to an allow-list of
//! paths or by exclusion patterns.
//!
//! ## Architecture
//!
//! - [`manifest`] - module identifier detection from `go.mod`
//! - [`profile`] - block-format profile reader
//! - [`parser`] - profile plus sources to [`Snapshot`]
//! - [`tree`] - directory tree construction
//! - [`summary`] - covered/total aggregation
//! - [`diff`] - base/current line comparison
//! - [`filter`] - allow-set and pattern filters
//! - [`badge`] - SVG coverage badge
//! - [`git_utils`] - changed-file resolution for a git revision or range
//! - [`model`] - the snapshot data model
//! - [`error`] - centralized error types
//! - [`cli`], [`config`], [`reporting`] - command-line surface, TOML config and output
//! - [`rule`], [`report_rule`] - the pipeline as a [`Rule`]
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use covtree_core::{diff, filter, parser};
//! use std::path::Path;
//!
//! # fn main() -> covtree_core::Result<()> {
//! let src = Path::new(".");
//! let base = parser::parse(Path::new("base.out"), src)?;
//! let current = parser::parse(Path::new("coverage.out"), src)?;
//!
//! let compared = diff::compute_diff(&base, &current);
//! let report = filter::filter_by_patterns(&compared, &[r"mock_.*\.go$"])?;
//!
//! println!("{:.1}% covered", report.summary.percent);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All functions that can fail return [`Result<T>`], an alias for
//! `std::result::Result<T, CoverageError>`. See the [`error`] module.

// Module declarations
pub mod badge;
pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod filter;
pub mod git_utils;
pub mod manifest;
pub mod model;
pub mod parser;
pub mod profile;
pub mod report_rule;
pub mod reporting;
pub mod rule;
pub mod summary;
pub mod tree;

// Public API exports
pub use crate::cli::{Cli, OutputFormat, ReportArgs};
pub use crate::report_rule::CoverageReportRule;

// Model exports
pub use crate::model::{
    DiffState, DiffSummary, FileRecord, LineCoverage, Snapshot, Summary, TreeNode,
};

// Config exports
pub use crate::config::{
    discover_config_from, load_config, load_config_from_path, merge_report_args, CovtreeConfig,
    FilterConfig, GeneralConfig,
};

// Error exports
pub use crate::error::{CoverageError as Error, Result};

// Git utils exports
pub use crate::git_utils::changed_files;

// Badge exports
pub use crate::badge::{generate_badge, parse_thresholds, Thresholds};

// Reporting exports
pub use crate::reporting::{render_summary_lines, render_table};

// Rule trait exports
pub use crate::rule::Rule;
