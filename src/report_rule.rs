//! The coverage report pipeline.
//!
//! [`CoverageReportRule`] parses the current profile, optionally diffs it
//! against a base profile, narrows it to files changed by a git reference,
//! drops files matching exclusion patterns, and writes the resulting snapshot
//! and, when asked, an SVG badge of its coverage percentage.

use crate::badge::write_badge;
use crate::cli::ReportArgs;
use crate::diff::compute_diff;
use crate::error::Result;
use crate::filter::{compile_patterns, filter_by_paths, filter_by_regex};
use crate::git_utils::changed_files;
use crate::model::Snapshot;
use crate::parser;
use crate::reporting::{render_summary_lines, write_report};
use crate::rule::Rule;
use crate::rule_error;

/// Rule producing a coverage [`Snapshot`] from a profile and a source tree.
#[derive(Debug, Default)]
pub struct CoverageReportRule;

impl CoverageReportRule {
    /// Creates the rule.
    pub fn new() -> Self {
        CoverageReportRule
    }
}

impl Rule for CoverageReportRule {
    type Config = ReportArgs;
    type Data = Snapshot;

    fn name() -> &'static str {
        "coverage_report"
    }

    fn description() -> &'static str {
        "Builds a per-line coverage snapshot with a file tree and summary, optionally diffed against a base profile"
    }

    fn run(&self, args: &ReportArgs) -> Result<()> {
        let snapshot = self.analyze(args)?;
        write_report(&snapshot, args.format, &args.output)?;

        if let Some(badge) = &args.badge {
            write_badge(snapshot.summary.percent, &args.badge_threshold, badge)?;
        }

        if !args.quiet {
            for line in render_summary_lines(&snapshot) {
                eprintln!("{line}");
            }
            if let Some(badge) = &args.badge {
                eprintln!("Coverage badge written to {}", badge.display());
            }
        }
        Ok(())
    }

    #[tracing::instrument(level = "info", skip_all, fields(profile = %args.profile.display()))]
    fn analyze(&self, args: &ReportArgs) -> Result<Snapshot> {
        // Bad patterns should fail before any source file is read.
        let exclusions = compile_patterns(&args.exclude)?;

        let mut snapshot = parser::parse(&args.profile, &args.src)?;

        if let Some(base_path) = &args.base {
            let base = parser::parse(base_path, &args.src)?;
            snapshot = compute_diff(&base, &snapshot);
        }

        if let Some(reference) = &args.git_ref {
            let allowed = changed_files(&args.src, reference)?;
            snapshot = filter_by_paths(&snapshot, &allowed);
        }

        if !exclusions.is_empty() {
            let before = snapshot.files.len();
            snapshot = filter_by_regex(&snapshot, &exclusions);
            if before > 0 && snapshot.is_empty() {
                return Err(rule_error!(Self::name(), "all files excluded by patterns"));
            }
        }

        tracing::info!(
            files = snapshot.files.len(),
            percent = snapshot.summary.percent,
            diff_mode = snapshot.is_diff_mode,
            "Coverage report ready"
        );
        Ok(snapshot)
    }
}
