//! Error types for covtree.
//!
//! This module defines the error type shared by every stage of the coverage
//! pipeline. Fatal conditions (a missing manifest, a malformed profile, an
//! invalid exclusion pattern) carry the offending input so the caller can
//! report exactly what failed. Unreadable source files are not errors at this
//! level; the parser skips them and keeps going.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// The main error type for covtree operations.
#[derive(Debug)]
pub enum CoverageError {
    /// The project manifest is missing or declares no module identifier.
    ManifestError {
        /// The manifest path that was inspected.
        path: PathBuf,
        /// Description of what was missing.
        message: String,
        /// The underlying IO error, if the manifest could not be opened.
        source: Option<io::Error>,
    },

    /// The coverage profile is not valid block-format data.
    ProfileError {
        /// The profile file, when parsing from disk.
        file: Option<PathBuf>,
        /// 1-based line number of the offending record, if known.
        line: Option<usize>,
        /// Description of the problem.
        context: String,
        /// The underlying error.
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An exclusion pattern failed to compile.
    PatternError {
        /// The pattern as supplied by the caller.
        pattern: String,
        /// The underlying regex error.
        source: regex::Error,
    },

    /// An error occurred during file system operations.
    IoError {
        /// The operation being performed.
        operation: String,
        /// The path involved in the error.
        path: Option<PathBuf>,
        /// The underlying IO error.
        source: Option<io::Error>,
    },

    /// An error occurred while loading configuration or serializing a report.
    ConfigError {
        /// Description of the issue.
        message: String,
        /// The config file path, if applicable.
        path: Option<PathBuf>,
        /// The underlying error.
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error occurred while resolving changed files from Git.
    GitError {
        /// The Git operation being performed.
        operation: String,
        /// The repository path.
        repo_path: Option<PathBuf>,
        /// The underlying error.
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error indicating an invalid argument or input.
    InvalidInput {
        /// Description of the invalid input.
        message: String,
        /// The argument or value that was invalid.
        argument: Option<String>,
    },
}

impl CoverageError {
    /// Creates a `ManifestError` for the manifest at `path`.
    pub fn manifest_not_found(path: PathBuf, message: impl Into<String>) -> Self {
        Self::ManifestError {
            path,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a `ManifestError` caused by an IO failure while opening the manifest.
    pub fn manifest_unreadable(path: PathBuf, source: io::Error) -> Self {
        Self::ManifestError {
            path,
            message: "manifest could not be read".to_string(),
            source: Some(source),
        }
    }

    /// Creates a `ProfileError` with the given context.
    pub fn profile_error(context: impl Into<String>) -> Self {
        Self::ProfileError {
            file: None,
            line: None,
            context: context.into(),
            source: None,
        }
    }

    /// Creates a `ProfileError` pointing at a specific record line.
    ///
    /// # Arguments
    /// * `line` - 1-based line number inside the profile.
    /// * `context` - A description of what is wrong with the line.
    pub fn profile_error_at(line: usize, context: impl Into<String>) -> Self {
        Self::ProfileError {
            file: None,
            line: Some(line),
            context: context.into(),
            source: None,
        }
    }

    /// Attaches the profile path to a `ProfileError`. Other variants are returned unchanged.
    #[must_use]
    pub fn with_profile_file(self, path: PathBuf) -> Self {
        match self {
            Self::ProfileError {
                line,
                context,
                source,
                ..
            } => Self::ProfileError {
                file: Some(path),
                line,
                context,
                source,
            },
            other => other,
        }
    }

    /// Creates a `PatternError` for an exclusion pattern that failed to compile.
    pub fn pattern_error(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::PatternError {
            pattern: pattern.into(),
            source,
        }
    }

    /// Creates a new `IoError` with a path and underlying error.
    pub fn io_error_with_source(
        operation: impl Into<String>,
        path: PathBuf,
        source: io::Error,
    ) -> Self {
        Self::IoError {
            operation: operation.into(),
            path: Some(path),
            source: Some(source),
        }
    }

    /// Creates a new `ConfigError` with the given message.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Creates a new `ConfigError` with a file path.
    pub fn config_error_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::ConfigError {
            message: message.into(),
            path: Some(path),
            source: None,
        }
    }

    /// Creates a new `GitError` with a repository path.
    pub fn git_error_with_repo(operation: impl Into<String>, repo_path: PathBuf) -> Self {
        Self::GitError {
            operation: operation.into(),
            repo_path: Some(repo_path),
            source: None,
        }
    }

    /// Creates a new `InvalidInput` error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            argument: None,
        }
    }

    /// Creates a new `InvalidInput` error with an argument name.
    pub fn invalid_input_with_arg(message: impl Into<String>, argument: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            argument: Some(argument.into()),
        }
    }

    /// Returns the name of the error variant.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ManifestError { .. } => "ManifestError",
            Self::ProfileError { .. } => "ProfileError",
            Self::PatternError { .. } => "PatternError",
            Self::IoError { .. } => "IoError",
            Self::ConfigError { .. } => "ConfigError",
            Self::GitError { .. } => "GitError",
            Self::InvalidInput { .. } => "InvalidInput",
        }
    }

    /// Returns suggested recovery actions for the error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ManifestError { .. } => vec![
                "Point --src at the directory containing go.mod".to_string(),
                "Ensure go.mod declares a `module` directive".to_string(),
            ],
            Self::ProfileError { line, .. } => {
                let mut s = vec![
                    "Regenerate the profile with `go test -coverprofile=coverage.out`".to_string(),
                    "Check that the first line is a `mode:` declaration".to_string(),
                ];
                if line.is_some() {
                    s.push(
                        "Records must look like `file.go:1.2,3.4 <statements> <count>`"
                            .to_string(),
                    );
                }
                s
            }
            Self::PatternError { .. } => vec![
                "Check the --exclude pattern for unbalanced brackets or escapes".to_string(),
                "Patterns use Rust `regex` syntax".to_string(),
            ],
            Self::IoError { .. } => vec![
                "Check that the path exists and is accessible".to_string(),
                "Verify you have the necessary permissions".to_string(),
            ],
            Self::ConfigError { .. } => vec![
                "Check the configuration file syntax".to_string(),
                "Ensure the file is valid TOML format".to_string(),
            ],
            Self::GitError { .. } => vec![
                "Ensure --src is inside a Git repository".to_string(),
                "Verify the --ref revision or range exists".to_string(),
            ],
            Self::InvalidInput { .. } => vec![
                "Review the command-line arguments".to_string(),
                "Check the documentation for valid input formats".to_string(),
            ],
        }
    }
}

impl fmt::Display for CoverageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManifestError { path, message, .. } => {
                write!(f, "Manifest error in '{}': {}", path.display(), message)
            }
            Self::ProfileError {
                file,
                line,
                context,
                ..
            } => {
                write!(f, "Profile error")?;
                if let Some(file) = file {
                    write!(f, " in '{}'", file.display())?;
                }
                if let Some(line) = line {
                    write!(f, " at line {}", line)?;
                }
                write!(f, ": {}", context)
            }
            Self::PatternError { pattern, source } => {
                write!(f, "Invalid exclusion pattern '{}': {}", pattern, source)
            }
            Self::IoError {
                operation, path, ..
            } => {
                if let Some(p) = path {
                    write!(
                        f,
                        "IO error during '{}' at '{}': operation failed",
                        operation,
                        p.display()
                    )
                } else {
                    write!(f, "IO error during '{}': operation failed", operation)
                }
            }
            Self::ConfigError { message, path, .. } => {
                if let Some(p) = path {
                    write!(f, "Configuration error in '{}': {}", p.display(), message)
                } else {
                    write!(f, "Configuration error: {}", message)
                }
            }
            Self::GitError {
                operation,
                repo_path,
                ..
            } => {
                if let Some(path) = repo_path {
                    write!(
                        f,
                        "Git error during '{}' at '{}': operation failed",
                        operation,
                        path.display()
                    )
                } else {
                    write!(f, "Git error during '{}': operation failed", operation)
                }
            }
            Self::InvalidInput { message, argument } => {
                if let Some(arg) = argument {
                    write!(f, "Invalid input '{}': {}", arg, message)
                } else {
                    write!(f, "Invalid input: {}", message)
                }
            }
        }
    }
}

impl std::error::Error for CoverageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ManifestError { source, .. } => source.as_ref().map(|e| e as _),
            Self::ProfileError { source, .. } => source.as_ref().map(|s| s.as_ref() as _),
            Self::PatternError { source, .. } => Some(source),
            Self::IoError { source, .. } => source.as_ref().map(|e| e as _),
            Self::ConfigError { source, .. } => source.as_ref().map(|s| s.as_ref() as _),
            Self::GitError { source, .. } => source.as_ref().map(|s| s.as_ref() as _),
            Self::InvalidInput { .. } => None,
        }
    }
}

impl From<io::Error> for CoverageError {
    fn from(err: io::Error) -> Self {
        Self::IoError {
            operation: "file operation".to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<toml::de::Error> for CoverageError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML: {}", err),
            path: None,
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for CoverageError {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse/serialize JSON: {}", err),
            path: None,
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for CoverageError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to serialize YAML: {}", err),
            path: None,
            source: Some(Box::new(err)),
        }
    }
}

impl From<git2::Error> for CoverageError {
    fn from(err: git2::Error) -> Self {
        Self::GitError {
            operation: "git operation".to_string(),
            repo_path: None,
            source: Some(Box::new(err)),
        }
    }
}

/// A type alias for `Result<T, CoverageError>`.
pub type Result<T> = std::result::Result<T, CoverageError>;
