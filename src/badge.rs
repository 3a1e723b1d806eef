//! SVG coverage badge.
//!
//! The badge is a flat two-part shield reading `coverage | NN.N%`. Its right
//! half is coloured by comparing the percentage against a red/yellow
//! threshold pair: at or below `red` is red, at or above `yellow` is green,
//! and anything in between is yellow.

use crate::error::{CoverageError, Result};
use crate::reporting::STDOUT_PATH;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

const BADGE_RED: &str = "#e05d44";
const BADGE_YELLOW: &str = "#dfb317";
const BADGE_GREEN: &str = "#4c1";

const LABEL_WIDTH: u32 = 63;
const VALUE_WIDTH: u32 = 48;
const HEIGHT: u32 = 20;

const THRESHOLD_ARG: &str = "--badge-threshold";

/// Colour thresholds for the badge, as percentages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Highest percentage still shown red.
    pub red: f64,
    /// Lowest percentage shown green.
    pub yellow: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            red: 40.0,
            yellow: 70.0,
        }
    }
}

/// Parses a `red,yellow` threshold pair such as `40,70`.
///
/// # Errors
///
/// Returns an `InvalidInput` error if the input is not two comma-separated
/// numbers, either value lies outside `0..=100`, or `red` is not below
/// `yellow`.
pub fn parse_thresholds(input: &str) -> Result<Thresholds> {
    let Some((red, yellow)) = input.split_once(',').filter(|(_, rest)| !rest.contains(',')) else {
        return Err(CoverageError::invalid_input_with_arg(
            format!("expected red,yellow (e.g. 40,70), got '{}'", input),
            THRESHOLD_ARG,
        ));
    };

    let red = parse_percent(red, "red")?;
    let yellow = parse_percent(yellow, "yellow")?;

    if red >= yellow {
        return Err(CoverageError::invalid_input_with_arg(
            format!("red threshold ({}) must be less than yellow threshold ({})", red, yellow),
            THRESHOLD_ARG,
        ));
    }

    Ok(Thresholds { red, yellow })
}

fn parse_percent(raw: &str, which: &str) -> Result<f64> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        CoverageError::invalid_input_with_arg(
            format!("invalid {} threshold '{}'", which, raw.trim()),
            THRESHOLD_ARG,
        )
    })?;
    if !(0.0..=100.0).contains(&value) {
        return Err(CoverageError::invalid_input_with_arg(
            format!("{} threshold {} is not between 0 and 100", which, value),
            THRESHOLD_ARG,
        ));
    }
    Ok(value)
}

/// Fill colour for the value half of the badge.
#[must_use]
pub fn badge_color(percent: f64, thresholds: &Thresholds) -> &'static str {
    if percent >= thresholds.yellow {
        BADGE_GREEN
    } else if percent > thresholds.red {
        BADGE_YELLOW
    } else {
        BADGE_RED
    }
}

/// Renders the badge SVG. `percent` is clamped to `0..=100` first.
#[must_use]
pub fn generate_badge(percent: f64, thresholds: &Thresholds) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let color = badge_color(percent, thresholds);
    let label = format!("{:.1}%", percent);

    let width = LABEL_WIDTH + VALUE_WIDTH;
    let label_x = LABEL_WIDTH / 2;
    let value_x = LABEL_WIDTH + VALUE_WIDTH / 2;

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{width}" height="{HEIGHT}" role="img" aria-label="coverage: {label}">
  <title>coverage: {label}</title>
  <g shape-rendering="crispEdges">
    <rect width="{width}" height="{HEIGHT}" fill="#555"/>
    <rect x="{LABEL_WIDTH}" width="{VALUE_WIDTH}" height="{HEIGHT}" fill="{color}"/>
  </g>
  <g fill="#fff" text-anchor="middle" font-family="Verdana,Geneva,DejaVu Sans,sans-serif" text-rendering="geometricPrecision" font-size="11">
    <text aria-hidden="true" x="{label_x}" y="15" fill="#010101" fill-opacity=".3">coverage</text>
    <text x="{label_x}" y="14">coverage</text>
    <text aria-hidden="true" x="{value_x}" y="15" fill="#010101" fill-opacity=".3">{label}</text>
    <text x="{value_x}" y="14">{label}</text>
  </g>
</svg>"##
    )
}

/// Writes the badge to `output`, or to stdout when it is `-`.
///
/// # Errors
///
/// Returns an `IoError` if the badge cannot be written.
pub fn write_badge(percent: f64, thresholds: &Thresholds, output: &Path) -> Result<()> {
    let svg = generate_badge(percent, thresholds);

    if output == Path::new(STDOUT_PATH) {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{svg}")?;
        return Ok(());
    }

    fs::write(output, svg)
        .map_err(|e| CoverageError::io_error_with_source("write badge", output.to_path_buf(), e))?;
    tracing::info!(path = %output.display(), percent, "Badge written");
    Ok(())
}
