//! Configuration file support for covtree.
//!
//! Settings can live in a TOML file next to the project (`Covtree.toml`,
//! `.covtree.toml` or `covtree.toml`, searched from the current directory
//! upwards) or in a file passed with `--config`. Command-line arguments take
//! precedence over file values, which take precedence over defaults.
//!
//! ```toml
//! [general]
//! src = "."
//! profile = "coverage.out"
//! format = "table"
//! badge = "coverage.svg"
//! badge_threshold = "50,80"
//!
//! [filter]
//! exclude = ["mock_.*\\.go$", "_gen\\.go$"]
//! ref = "origin/main..HEAD"
//! ```

use crate::badge::parse_thresholds;
use crate::cli::{OutputFormat, ReportArgs};
use crate::error::{CoverageError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file names to search for.
const DEFAULT_CONFIG_FILES: &[&str] = &["Covtree.toml", ".covtree.toml", "covtree.toml"];

/// Main configuration structure representing a covtree configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CovtreeConfig {
    /// Input and output settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// File selection settings.
    #[serde(default)]
    pub filter: FilterConfig,
}

/// Input and output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Source root containing `go.mod`.
    pub src: Option<PathBuf>,

    /// Coverage profile to report on.
    pub profile: Option<PathBuf>,

    /// Base profile to diff against.
    pub base: Option<PathBuf>,

    /// Where to write the report (`-` for stdout).
    pub output_file: Option<PathBuf>,

    /// Report format (`json`, `yaml` or `table`).
    pub format: Option<String>,

    /// Suppress the summary on stderr.
    #[serde(default)]
    pub quiet: bool,

    /// Where to write the SVG badge (`-` for stdout).
    pub badge: Option<PathBuf>,

    /// Badge colour thresholds as `"red,yellow"`.
    pub badge_threshold: Option<String>,
}

/// File selection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Regular expressions; files whose path matches any are dropped.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Git revision or range restricting the report to changed files.
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
}

/// Load configuration from a specific file path.
///
/// Returns `Ok(None)` if the file doesn't exist and an error if it exists but
/// cannot be parsed.
pub fn load_config_from_path(path: &Path) -> Result<Option<CovtreeConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        CoverageError::io_error_with_source("read config file", path.to_path_buf(), e)
    })?;
    let config: CovtreeConfig = toml::from_str(&content).map_err(|e| {
        CoverageError::config_error_with_path(format!("Failed to parse TOML: {}", e), path.to_path_buf())
    })?;

    tracing::debug!(path = %path.display(), "Loaded configuration file");
    Ok(Some(config))
}

/// Searches `start` and its ancestors for one of the default config file names.
pub fn discover_config_from(start: &Path) -> Result<Option<(PathBuf, CovtreeConfig)>> {
    let mut current_dir = start.to_path_buf();

    loop {
        for config_name in DEFAULT_CONFIG_FILES {
            let config_path = current_dir.join(config_name);
            if let Some(config) = load_config_from_path(&config_path)? {
                return Ok(Some((config_path, config)));
            }
        }

        if !current_dir.pop() {
            break;
        }
    }

    Ok(None)
}

/// Load configuration from a specified path or discover it from the current directory.
///
/// An explicitly given path that does not exist is an error; a missing
/// discovered file is not.
pub fn load_config(config_path: Option<&Path>) -> Result<Option<(PathBuf, CovtreeConfig)>> {
    if let Some(path) = config_path {
        return match load_config_from_path(path)? {
            Some(config) => Ok(Some((path.to_path_buf(), config))),
            None => Err(CoverageError::config_error_with_path(
                "configuration file not found",
                path.to_path_buf(),
            )),
        };
    }
    discover_config_from(&std::env::current_dir()?)
}

/// Merge report CLI args with config file values.
///
/// Priority order:
/// 1. CLI arguments (highest priority)
/// 2. Config file values
/// 3. Default values (lowest priority)
///
/// Clap cannot tell an explicit value from its default, so a config value is
/// only applied where the CLI still holds the default. Exclusion patterns
/// are combined, config first.
pub fn merge_report_args(cli_args: &ReportArgs, config: &CovtreeConfig) -> Result<ReportArgs> {
    let mut merged = cli_args.clone();
    let defaults = ReportArgs::default();

    if let Some(src) = &config.general.src {
        if merged.src == defaults.src {
            merged.src = src.clone();
        }
    }

    if let Some(profile) = &config.general.profile {
        if merged.profile == defaults.profile {
            merged.profile = profile.clone();
        }
    }

    if merged.base.is_none() {
        merged.base = config.general.base.clone();
    }

    if let Some(output) = &config.general.output_file {
        if merged.output == defaults.output {
            merged.output = output.clone();
        }
    }

    if let Some(format) = &config.general.format {
        if merged.format == defaults.format {
            merged.format = parse_output_format(format).ok_or_else(|| {
                CoverageError::config_error(format!(
                    "unknown format '{}' (expected json, yaml or table)",
                    format
                ))
            })?;
        }
    }

    merged.quiet = merged.quiet || config.general.quiet;

    if merged.badge.is_none() {
        merged.badge = config.general.badge.clone();
    }

    if let Some(thresholds) = &config.general.badge_threshold {
        if merged.badge_threshold == defaults.badge_threshold {
            merged.badge_threshold = parse_thresholds(thresholds).map_err(|e| {
                CoverageError::config_error(format!("invalid badge_threshold: {}", e))
            })?;
        }
    }

    if !config.filter.exclude.is_empty() {
        let mut combined = config.filter.exclude.clone();
        combined.extend(merged.exclude.iter().cloned());
        merged.exclude = combined;
    }

    if merged.git_ref.is_none() {
        merged.git_ref = config.filter.git_ref.clone();
    }

    Ok(merged)
}

/// Parse an output format name.
fn parse_output_format(s: &str) -> Option<OutputFormat> {
    match s.to_lowercase().as_str() {
        "json" => Some(OutputFormat::Json),
        "yaml" => Some(OutputFormat::Yaml),
        "table" => Some(OutputFormat::Table),
        _ => None,
    }
}
