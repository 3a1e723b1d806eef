//! Rule Trait
//!
//! This module defines the [`Rule`] trait, the common interface for a unit of
//! covtree work that can be driven either from the command line or as a
//! library call.
//!
//! # Overview
//!
//! A rule:
//!
//! - has a name for identification in logs and errors
//! - produces structured, serializable data in [`Rule::analyze`]
//! - writes that data somewhere in [`Rule::run`]
//!
//! # Implementing a Custom Rule
//!
//! ```rust,no_run
//! use covtree_core::rule::Rule;
//! use covtree_core::error::Result;
//! use covtree_core::parser;
//! use serde::Serialize;
//! use std::path::PathBuf;
//!
//! #[derive(Debug, Serialize)]
//! struct Percent(f64);
//!
//! #[derive(Clone, Debug)]
//! struct PercentConfig {
//!     profile: PathBuf,
//!     src: PathBuf,
//! }
//!
//! struct PercentRule;
//!
//! impl Rule for PercentRule {
//!     type Data = Percent;
//!     type Config = PercentConfig;
//!
//!     fn name() -> &'static str {
//!         "percent"
//!     }
//!
//!     fn description() -> &'static str {
//!         "Prints the overall coverage percentage"
//!     }
//!
//!     fn run(&self, config: &PercentConfig) -> Result<()> {
//!         println!("{:.1}", self.analyze(config)?.0);
//!         Ok(())
//!     }
//!
//!     fn analyze(&self, config: &PercentConfig) -> Result<Percent> {
//!         let snapshot = parser::parse(&config.profile, &config.src)?;
//!         Ok(Percent(snapshot.summary.percent))
//!     }
//! }
//! ```

use crate::error::Result;
use serde::Serialize;
use std::fmt::Debug;

/// Common trait for covtree rules.
///
/// Each rule specifies its own configuration and data types via associated
/// types.
pub trait Rule: Sized {
    /// The type of configuration data this rule accepts.
    ///
    /// This is typically a struct containing CLI arguments merged with
    /// config file settings.
    type Config: Clone + Debug + Send + Sync;

    /// The type of data this rule produces.
    ///
    /// This is the structured data returned by the `analyze` method,
    /// which can be serialized to JSON or YAML.
    type Data: Debug + Send + Sync + Serialize;

    /// Returns the name of this rule. Should be a unique, snake_case string.
    fn name() -> &'static str;

    /// Returns a human-readable description of this rule.
    fn description() -> &'static str;

    /// Runs the rule with the given configuration and outputs results.
    ///
    /// # Errors
    ///
    /// Returns a [`CoverageError`](crate::error::CoverageError) if analysis
    /// fails or the output cannot be written.
    fn run(&self, config: &Self::Config) -> Result<()>;

    /// Produces the rule's data without writing any output.
    ///
    /// # Errors
    ///
    /// Returns a [`CoverageError`](crate::error::CoverageError) if the data
    /// cannot be produced.
    fn analyze(&self, config: &Self::Config) -> Result<Self::Data>;
}

/// Helper macro for creating invalid-input errors tagged with a rule name.
///
/// # Examples
///
/// ```rust
/// # use covtree_core::rule_error;
/// let error = rule_error!("coverage_report", "all files excluded by patterns");
/// assert!(error.to_string().contains("coverage_report"));
/// ```
#[macro_export]
macro_rules! rule_error {
    ($rule_name:expr, $msg:expr) => {
        $crate::error::CoverageError::invalid_input(format!("[{}] {}", $rule_name, $msg))
    };
    ($rule_name:expr, $fmt:expr, $($arg:tt)*) => {
        $crate::error::CoverageError::invalid_input(
            format!("[{}] {}", $rule_name, format!($fmt, $($arg)*))
        )
    };
}
