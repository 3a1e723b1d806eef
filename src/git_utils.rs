//! Git utility functions for covtree.
//!
//! Resolves the set of files touched by a revision or revision range, which
//! feeds the allow-set filter when a report should only cover changed code.

use crate::error::{CoverageError, Result};
use git2::{Delta, DiffFindOptions, DiffOptions, Repository, RevparseMode, Tree};
use std::collections::HashSet;
use std::path::Path;
use tracing::instrument;

/// Returns the paths added, copied, modified or renamed by `reference`.
///
/// `reference` is either a range (`main..HEAD`, `main...HEAD`) or a single
/// revision, which is compared with its first parent. A root commit is
/// compared with the empty tree. Paths are relative to `repo_root`, which may
/// be a subdirectory of the work tree, and use `/` separators; changes outside
/// `repo_root` are dropped. Renamed files are reported under their new name.
///
/// # Errors
///
/// Returns a [`CoverageError::GitError`] if `repo_root` is not inside a
/// repository or `reference` does not resolve.
///
/// # Examples
///
/// ```no_run
/// use covtree_core::git_utils;
/// use std::path::Path;
///
/// # fn main() -> covtree_core::error::Result<()> {
/// let changed = git_utils::changed_files(Path::new("."), "origin/main..HEAD")?;
/// println!("{} files changed", changed.len());
/// # Ok(())
/// # }
/// ```
#[instrument(level = "debug", skip(repo_root), fields(repo_root = %repo_root.display()), err)]
pub fn changed_files(repo_root: &Path, reference: &str) -> Result<HashSet<String>> {
    let git_err = |operation: String| {
        move |e: git2::Error| CoverageError::GitError {
            operation,
            repo_path: Some(repo_root.to_path_buf()),
            source: Some(Box::new(e)),
        }
    };

    let repo = Repository::discover(repo_root).map_err(git_err("open repository".to_string()))?;
    let prefix = workdir_prefix(&repo, repo_root)?;
    let (old_tree, new_tree) = resolve_trees(&repo, reference)
        .map_err(git_err(format!("resolve '{}'", reference)))?;

    let mut diff_opts = DiffOptions::new();
    let mut diff = repo
        .diff_tree_to_tree(old_tree.as_ref(), Some(&new_tree), Some(&mut diff_opts))
        .map_err(git_err(format!("diff '{}'", reference)))?;
    diff.find_similar(Some(DiffFindOptions::new().renames(true)))
        .map_err(git_err("detect renames".to_string()))?;

    let files: HashSet<String> = diff
        .deltas()
        .filter(|delta| {
            matches!(
                delta.status(),
                Delta::Added | Delta::Copied | Delta::Modified | Delta::Renamed
            )
        })
        .filter_map(|delta| delta.new_file().path().map(path_to_slash))
        .filter_map(|path| strip_dir_prefix(&path, &prefix).map(str::to_string))
        .collect();

    tracing::debug!("Found {} changed files", files.len());
    Ok(files)
}

/// Returns `(old, new)` trees for a range or a single revision.
fn resolve_trees<'r>(
    repo: &'r Repository,
    reference: &str,
) -> std::result::Result<(Option<Tree<'r>>, Tree<'r>), git2::Error> {
    if reference.contains("..") {
        let spec = repo.revparse(reference)?;
        let (Some(from), Some(to)) = (spec.from(), spec.to()) else {
            return Err(git2::Error::from_str("range must name both ends"));
        };
        let to_commit = to.peel_to_commit()?;
        let from_commit = if spec.mode().contains(RevparseMode::MERGE_BASE) {
            let base = repo.merge_base(from.peel_to_commit()?.id(), to_commit.id())?;
            repo.find_commit(base)?
        } else {
            from.peel_to_commit()?
        };
        return Ok((Some(from_commit.tree()?), to_commit.tree()?));
    }

    let commit = repo.revparse_single(reference)?.peel_to_commit()?;
    let parent_tree = if commit.parent_count() == 0 {
        tracing::debug!(commit = %commit.id(), "Root commit; diffing against the empty tree");
        None
    } else {
        Some(commit.parent(0)?.tree()?)
    };
    Ok((parent_tree, commit.tree()?))
}

/// Location of `dir` inside the work tree, as a `/`-separated prefix (empty at the top).
fn workdir_prefix(repo: &Repository, dir: &Path) -> Result<String> {
    let Some(workdir) = repo.workdir() else {
        return Err(CoverageError::git_error_with_repo(
            "bare repositories have no work tree",
            dir.to_path_buf(),
        ));
    };
    let canonical = |p: &Path| {
        p.canonicalize()
            .map_err(|e| CoverageError::io_error_with_source("canonicalize path", p.to_path_buf(), e))
    };
    let workdir = canonical(workdir)?;
    let dir = canonical(dir)?;
    Ok(dir
        .strip_prefix(&workdir)
        .map(path_to_slash)
        .unwrap_or_default())
}

fn strip_dir_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(path);
    }
    path.strip_prefix(prefix)?.strip_prefix('/')
}

fn path_to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
