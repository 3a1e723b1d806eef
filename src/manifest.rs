//! Module identifier lookup from the project manifest.
//!
//! Profiles name files by their fully qualified import path
//! (`example.com/project/pkg/file.go`). To map those back onto the source
//! tree the parser needs the module identifier declared in `go.mod`.

use crate::error::{CoverageError, Result};
use std::fs;
use std::path::Path;

/// Manifest file expected at the top of the source root.
pub const MANIFEST_FILE: &str = "go.mod";

/// Directive keyword that declares the module identifier.
const MODULE_DIRECTIVE: &str = "module";

/// Returns the module identifier declared in `<src_root>/go.mod`.
///
/// The first line of the form `module <identifier>` wins; the identifier is
/// trimmed of surrounding whitespace.
///
/// # Errors
///
/// Returns [`CoverageError::ManifestError`] if the manifest cannot be read or
/// declares no module.
#[tracing::instrument(level = "debug", skip_all, fields(src_root = %src_root.display()))]
pub fn detect_module_path(src_root: &Path) -> Result<String> {
    let manifest_path = src_root.join(MANIFEST_FILE);
    let content = fs::read_to_string(&manifest_path)
        .map_err(|e| CoverageError::manifest_unreadable(manifest_path.clone(), e))?;

    match parse_module_directive(&content) {
        Some(module) => {
            tracing::debug!(%module, "Resolved module identifier");
            Ok(module)
        }
        None => Err(CoverageError::manifest_not_found(
            manifest_path,
            "module directive not found",
        )),
    }
}

/// Extracts the identifier from the first `module` directive in manifest text.
#[must_use]
pub fn parse_module_directive(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let rest = line.trim().strip_prefix(MODULE_DIRECTIVE)?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let module = rest.trim();
        (!module.is_empty()).then(|| module.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_module_path() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILE),
            "module example.com/test\n\ngo 1.21\n",
        )
        .unwrap();
        assert_eq!(detect_module_path(dir.path()).unwrap(), "example.com/test");
    }

    #[test]
    fn test_detect_module_path_without_directive() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "go 1.21\n").unwrap();
        let err = detect_module_path(dir.path()).unwrap_err();
        assert_eq!(err.name(), "ManifestError");
        assert!(err.to_string().contains("module directive not found"));
    }

    #[test]
    fn test_detect_module_path_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let err = detect_module_path(dir.path()).unwrap_err();
        assert!(matches!(err, CoverageError::ManifestError { .. }));
        assert!(err.to_string().contains("go.mod"));
    }

    #[test]
    fn test_parse_module_directive_trims_and_takes_first() {
        let content = "// comment\n   module   github.com/a/b   \nmodule other\n";
        assert_eq!(
            parse_module_directive(content).as_deref(),
            Some("github.com/a/b")
        );
    }

    #[test]
    fn test_parse_module_directive_ignores_lookalike_keywords() {
        assert_eq!(parse_module_directive("modulepath x\n"), None);
        assert_eq!(parse_module_directive("module\n"), None);
    }
}
