//! Property-based tests for tree construction and aggregation.
//!
//! The tree must not depend on the order records arrive in, every file must
//! show up exactly once, and the summary must stay consistent with the
//! per-line classification no matter how the snapshot was filtered.

use covtree_core::filter::filter_by_paths;
use covtree_core::tree::build_tree_from_paths;
use covtree_core::{FileRecord, LineCoverage, Snapshot, TreeNode};
use proptest::prelude::*;
use std::collections::HashSet;

fn any_path() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec!["a", "b", "pkg", "x.go", "y.go"]), 1..4)
        .prop_map(|parts| parts.join("/"))
}

fn any_coverage() -> impl Strategy<Value = Vec<LineCoverage>> {
    prop::collection::vec(
        prop::sample::select(vec![
            LineCoverage::NoStatement,
            LineCoverage::Uncovered,
            LineCoverage::Covered,
        ]),
        0..12,
    )
}

fn any_files() -> impl Strategy<Value = Vec<FileRecord>> {
    prop::collection::btree_set(any_path(), 0..10).prop_flat_map(|paths| {
        let paths: Vec<String> = paths.into_iter().collect();
        let n = paths.len();
        prop::collection::vec(any_coverage(), n).prop_map(move |coverages| {
            paths
                .iter()
                .zip(coverages)
                .map(|(path, coverage)| FileRecord {
                    id: 0,
                    path: path.clone(),
                    lines: vec![String::new(); coverage.len()],
                    coverage,
                    diff_state: None,
                })
                .collect()
        })
    })
}

fn count_leaves(node: &TreeNode) -> usize {
    match node {
        TreeNode::File { .. } => 1,
        TreeNode::Directory { children, .. } => children.iter().map(count_leaves).sum(),
    }
}

fn assert_sorted(node: &TreeNode) {
    let children = node.children();
    for pair in children.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            (a.is_dir() && !b.is_dir()) || (a.is_dir() == b.is_dir() && a.name() <= b.name()),
            "{} before {}",
            a.name(),
            b.name()
        );
    }
    children.iter().for_each(assert_sorted);
}

proptest! {
    /// Property: the tree is independent of input order.
    #[test]
    fn prop_tree_is_order_independent(
        shuffled in prop::collection::btree_set(any_path(), 0..12)
            .prop_map(|set| set.into_iter().enumerate().map(|(i, p)| (p, i)).collect::<Vec<_>>())
            .prop_flat_map(|pairs| (Just(pairs.clone()), Just(pairs).prop_shuffle()))
    ) {
        let (ordered, permuted) = shuffled;
        let a = build_tree_from_paths(ordered.iter().map(|(p, i)| (p.as_str(), *i)));
        let b = build_tree_from_paths(permuted.iter().map(|(p, i)| (p.as_str(), *i)));
        prop_assert_eq!(a, b);
    }

    /// Property: one leaf per file, every id present, children sorted.
    #[test]
    fn prop_tree_has_every_file_once(files in any_files()) {
        let snapshot = Snapshot::from_files(files);
        prop_assert_eq!(snapshot.tree.name(), ".");
        prop_assert_eq!(count_leaves(&snapshot.tree), snapshot.files.len());

        let mut ids = snapshot.tree.file_ids();
        ids.sort_unstable();
        prop_assert_eq!(ids, (0..snapshot.files.len()).collect::<Vec<_>>());
        assert_sorted(&snapshot.tree);
    }

    /// Property: summary totals match the per-line classification.
    #[test]
    fn prop_summary_is_consistent(files in any_files()) {
        let snapshot = Snapshot::from_files(files);
        let all: Vec<LineCoverage> = snapshot.files.iter().flat_map(|f| f.coverage.clone()).collect();
        let total = all.iter().filter(|c| **c != LineCoverage::NoStatement).count();
        let covered = all.iter().filter(|c| **c == LineCoverage::Covered).count();

        prop_assert_eq!(snapshot.summary.total_lines, total);
        prop_assert_eq!(snapshot.summary.covered_lines, covered);
        prop_assert!(snapshot.summary.covered_lines <= snapshot.summary.total_lines);
        prop_assert!((0.0..=100.0).contains(&snapshot.summary.percent));
        if total == 0 {
            prop_assert_eq!(snapshot.summary.percent, 0.0);
        }
    }

    /// Property: filtering renumbers densely and is idempotent.
    #[test]
    fn prop_filter_by_paths_is_idempotent(files in any_files(), keep_mask in prop::collection::vec(any::<bool>(), 10)) {
        let snapshot = Snapshot::from_files(files);
        let allowed: HashSet<String> = snapshot
            .files
            .iter()
            .zip(keep_mask.iter().cycle())
            .filter(|(_, keep)| **keep)
            .map(|(f, _)| f.path.clone())
            .collect();

        let once = filter_by_paths(&snapshot, &allowed);
        let twice = filter_by_paths(&once, &allowed);
        prop_assert_eq!(&once, &twice);

        for (i, file) in once.files.iter().enumerate() {
            prop_assert_eq!(file.id, i);
            prop_assert!(allowed.contains(&file.path));
        }
        prop_assert!(once.summary.total_lines <= snapshot.summary.total_lines);
    }
}
