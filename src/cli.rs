use crate::badge::{parse_thresholds, Thresholds};
use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for `covtree`.
#[derive(Parser, Debug)]
#[command(
    name = "covtree",
    version,
    about = "Turn a Go coverage profile into a per-line coverage snapshot with a file tree and summary"
)]
pub struct Cli {
    #[command(flatten)]
    pub report: ReportArgs,

    /// Configuration file. Without it, `Covtree.toml`, `.covtree.toml` or
    /// `covtree.toml` is searched for from the current directory upwards.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Output format for the snapshot.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON snapshot.
    #[default]
    Json,
    /// YAML snapshot.
    Yaml,
    /// Per-file table with a totals row.
    Table,
}

/// Arguments that drive a single coverage report.
#[derive(Args, Clone, Debug, PartialEq)]
pub struct ReportArgs {
    /// Coverage profile written by `go test -coverprofile`.
    #[arg(long, default_value = "coverage.out")]
    pub profile: PathBuf,

    /// Base profile to diff against; enables diff mode.
    #[arg(long)]
    pub base: Option<PathBuf>,

    /// Source root containing `go.mod`.
    #[arg(long, default_value = ".")]
    pub src: PathBuf,

    /// Only report files changed by this git revision or range (e.g. `main..HEAD`).
    #[arg(long = "ref", value_name = "REF")]
    pub git_ref: Option<String>,

    /// Regular expression; files whose path matches are dropped. Repeatable.
    #[arg(long, value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Where to write the report; `-` means stdout.
    #[arg(short, long, default_value = "-")]
    pub output: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Do not print the coverage summary to stderr.
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write an SVG coverage badge here; `-` means stdout.
    #[arg(long, value_name = "FILE")]
    pub badge: Option<PathBuf>,

    /// Badge colour thresholds as `red,yellow` percentages.
    #[arg(long, value_name = "RED,YELLOW", default_value = "40,70", value_parser = threshold_arg)]
    pub badge_threshold: Thresholds,
}

fn threshold_arg(s: &str) -> Result<Thresholds, String> {
    parse_thresholds(s).map_err(|e| e.to_string())
}

impl Default for ReportArgs {
    fn default() -> Self {
        Self {
            profile: PathBuf::from("coverage.out"),
            base: None,
            src: PathBuf::from("."),
            git_ref: None,
            exclude: Vec::new(),
            output: PathBuf::from("-"),
            format: OutputFormat::Json,
            quiet: false,
            badge: None,
            badge_threshold: Thresholds::default(),
        }
    }
}
