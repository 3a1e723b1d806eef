//! covtree: report statement coverage from a Go coverage profile.
//!
//! Reads a `go test -coverprofile` file together with the module sources and
//! writes a per-line coverage snapshot (JSON, YAML or a table). With `--base`
//! the snapshot is diffed against an earlier profile; `--ref` and `--exclude`
//! narrow it to changed or non-generated files, and `--badge` also writes an
//! SVG badge of the final percentage.
//!
//! USAGE EXAMPLE (run from the Go module root):
//!   covtree --profile coverage.out --base main.out --format table --badge coverage.svg

use clap::Parser;
use color_eyre::eyre::{Report, Result, WrapErr};
use color_eyre::Section;
use covtree_core::{load_config, merge_report_args, Cli, CoverageReportRule, Error, Rule};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    color_eyre::install()?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .wrap_err("Failed to install tracing subscriber")?;

    let cli = Cli::parse();

    let loaded = load_config(cli.config.as_deref())
        .map_err(|e| with_suggestions(e, "Failed to load configuration"))?;
    let args = match loaded {
        Some((path, config)) => {
            tracing::info!(config = %path.display(), "Using configuration file");
            merge_report_args(&cli.report, &config)
                .map_err(|e| with_suggestions(e, "Invalid configuration"))?
        }
        None => cli.report,
    };
    tracing::debug!(?args, "Resolved report arguments");

    let rule = CoverageReportRule::new();
    rule.run(&args)
        .map_err(|e| with_suggestions(e, &format!("{} failed", CoverageReportRule::name())))?;

    Ok(())
}

/// Wraps a crate error into a report carrying its suggestions.
fn with_suggestions(err: Error, context: &str) -> Report {
    let suggestions = err.suggestions();
    suggestions
        .into_iter()
        .fold(Report::new(err).wrap_err(context.to_string()), |report, s| {
            report.suggestion(s)
        })
}
