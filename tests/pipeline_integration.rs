//! End-to-end tests for the coverage pipeline through the library API.
//!
//! Each test lays out a small Go module in a temp directory, writes a
//! coverage profile for it, and drives parse / diff / filter the way the
//! command-line tool does.

use covtree_core::cli::ReportArgs;
use covtree_core::{diff, filter, parser};
use covtree_core::{CoverageReportRule, DiffState, LineCoverage, Rule, TreeNode};
use git2::{Repository, Signature};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MODULE: &str = "github.com/acme/shop";

const MAIN_GO: &str = "package main

import \"github.com/acme/shop/cart\"

func main() {
	cart.New()
}
";

const CART_GO: &str = "package cart

type Cart struct{ items int }

func New() *Cart {
	return &Cart{}
}

func (c *Cart) Add() {
	c.items++
}
";

const MOCK_GO: &str = "package cart

func mockCart() *Cart { return nil }
";

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("file has a parent")).expect("create dirs");
    fs::write(path, content).expect("write file");
}

fn module_dir() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let root = dir.path();
    write(root, "go.mod", &format!("module {MODULE}\n\ngo 1.22\n"));
    write(root, "main.go", MAIN_GO);
    write(root, "cart/cart.go", CART_GO);
    write(root, "cart/mock_cart.go", MOCK_GO);
    dir
}

/// Profile in which `Add` never ran.
fn current_profile() -> String {
    format!(
        "mode: set
{MODULE}/main.go:5.13,7.2 1 1
{MODULE}/cart/cart.go:5.18,7.2 1 1
{MODULE}/cart/cart.go:9.22,11.2 1 0
{MODULE}/cart/mock_cart.go:3.25,3.37 1 0
"
    )
}

/// Older profile in which neither `New` nor `Add` ran.
fn base_profile() -> String {
    format!(
        "mode: set
{MODULE}/main.go:5.13,7.2 1 1
{MODULE}/cart/cart.go:5.18,7.2 1 0
{MODULE}/cart/cart.go:9.22,11.2 1 0
"
    )
}

#[test]
fn test_parse_builds_records_tree_and_summary() {
    let dir = module_dir();
    write(dir.path(), "coverage.out", &current_profile());

    let snapshot = parser::parse(&dir.path().join("coverage.out"), dir.path()).unwrap();

    let paths: Vec<&str> = snapshot.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["cart/cart.go", "cart/mock_cart.go", "main.go"]);
    for (i, file) in snapshot.files.iter().enumerate() {
        assert_eq!(file.id, i);
        assert_eq!(file.lines.len(), file.coverage.len());
    }

    let cart = snapshot.file("cart/cart.go").unwrap();
    assert_eq!(cart.coverage[0], LineCoverage::NoStatement);
    assert_eq!(cart.coverage[4], LineCoverage::Covered);
    assert_eq!(cart.coverage[9], LineCoverage::Uncovered);

    // main 3 + New 3 + Add 3 + mock 1
    assert_eq!(snapshot.summary.total_lines, 10);
    assert_eq!(snapshot.summary.covered_lines, 6);
    assert_eq!(snapshot.summary.percent, 60.0);

    let root = &snapshot.tree;
    assert_eq!(root.name(), ".");
    let names: Vec<&str> = root.children().iter().map(TreeNode::name).collect();
    assert_eq!(names, vec!["cart", "main.go"]);
    assert_eq!(root.file_ids(), vec![0, 1, 2]);
}

#[test]
fn test_unreadable_source_is_skipped_not_fatal() {
    let dir = module_dir();
    let profile = format!(
        "{}{MODULE}/gone/deleted.go:1.1,2.2 1 1\n",
        current_profile()
    );
    write(dir.path(), "coverage.out", &profile);

    let snapshot = parser::parse(&dir.path().join("coverage.out"), dir.path()).unwrap();
    assert_eq!(snapshot.files.len(), 3);
    assert!(snapshot.file("gone/deleted.go").is_none());
    assert_eq!(snapshot.files.last().unwrap().id, 2);
}

#[test]
fn test_missing_manifest_is_fatal() {
    let dir = module_dir();
    fs::remove_file(dir.path().join("go.mod")).unwrap();
    write(dir.path(), "coverage.out", &current_profile());

    let err = parser::parse(&dir.path().join("coverage.out"), dir.path()).unwrap_err();
    assert_eq!(err.name(), "ManifestError");
}

#[test]
fn test_malformed_profile_is_fatal() {
    let dir = module_dir();
    write(dir.path(), "coverage.out", "mode: set\nnot a coverage line\n");

    let err = parser::parse(&dir.path().join("coverage.out"), dir.path()).unwrap_err();
    assert_eq!(err.name(), "ProfileError");
    assert!(err.to_string().contains("coverage.out"));
}

#[test]
fn test_diff_then_filter() {
    let dir = module_dir();
    write(dir.path(), "coverage.out", &current_profile());
    write(dir.path(), "base.out", &base_profile());

    let current = parser::parse(&dir.path().join("coverage.out"), dir.path()).unwrap();
    let base = parser::parse(&dir.path().join("base.out"), dir.path()).unwrap();
    let compared = diff::compute_diff(&base, &current);

    assert!(compared.is_diff_mode);
    let cart = compared.file("cart/cart.go").unwrap();
    let states = cart.diff_state.as_deref().unwrap();
    assert_eq!(states[4], DiffState::NewlyCovered);
    assert_eq!(states[9], DiffState::UnchangedUncovered);
    assert_eq!(states[0], DiffState::NoChange);

    let ds = compared.diff_summary.unwrap();
    assert_eq!(ds.newly_covered_lines, 3);
    // mock_cart.go is new and uncovered.
    assert_eq!(ds.newly_uncovered_lines, 1);
    assert_eq!(ds.base_percent, 3.0 / 9.0 * 100.0);

    let filtered = filter::filter_by_patterns(&compared, &[r"mock_.*\.go$"]).unwrap();
    assert!(filtered.is_diff_mode);
    assert_eq!(filtered.files.len(), 2);
    let filtered_ds = filtered.diff_summary.unwrap();
    assert_eq!(filtered_ds.newly_uncovered_lines, 0);
    assert_eq!(filtered.summary.total_lines, 9);
    assert_eq!(filtered_ds.base_percent, ds.base_percent);
    assert_eq!(filtered_ds.delta_percent, filtered.summary.percent - filtered_ds.base_percent);

    let allowed: HashSet<String> = ["main.go".to_string()].into_iter().collect();
    let only_main = filter::filter_by_paths(&filtered, &allowed);
    assert_eq!(only_main.files.len(), 1);
    assert_eq!(only_main.files[0].id, 0);
    assert_eq!(only_main.summary.percent, 100.0);
}

fn commit_all(repo: &Repository, message: &str) {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("Test User", "test@example.com").unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap();
}

#[test]
fn test_report_rule_restricts_to_changed_files() {
    let dir = module_dir();
    let repo = Repository::init(dir.path()).unwrap();
    commit_all(&repo, "initial");

    write(
        dir.path(),
        "cart/cart.go",
        &CART_GO.replace("c.items++", "c.items += 1"),
    );
    commit_all(&repo, "tweak cart");

    write(dir.path(), "coverage.out", &current_profile());
    let args = ReportArgs {
        profile: dir.path().join("coverage.out"),
        src: dir.path().to_path_buf(),
        git_ref: Some("HEAD".to_string()),
        quiet: true,
        ..ReportArgs::default()
    };

    let snapshot = CoverageReportRule::new().analyze(&args).unwrap();
    let paths: Vec<&str> = snapshot.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["cart/cart.go"]);
    assert_eq!(snapshot.summary.total_lines, 6);
}
