//! Directory/file tree construction.
//!
//! Paths are split on `/` and merged into a single root named `.`. Once every
//! path is inserted, each directory's children are ordered directories first,
//! then files, each group ascending by name, so the result does not depend on
//! the order records were supplied in.

use crate::model::{FileRecord, TreeNode};
use std::cmp::Ordering;

/// Builds the tree for a snapshot's file list, using each record's `id` as the leaf back-reference.
#[must_use]
pub fn build_tree(files: &[FileRecord]) -> TreeNode {
    build_tree_from_paths(files.iter().map(|f| (f.path.as_str(), f.id)))
}

/// Builds a tree from `(path, file_id)` pairs.
///
/// Every pair yields exactly one leaf. Directory nodes are shared between
/// paths with a common prefix; a file and a directory with the same name stay
/// separate nodes.
#[must_use]
pub fn build_tree_from_paths<'a, I>(paths: I) -> TreeNode
where
    I: IntoIterator<Item = (&'a str, usize)>,
{
    let mut root = TreeNode::root();
    for (path, file_id) in paths {
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        if parts.is_empty() {
            tracing::warn!(%path, file_id, "Skipping tree insertion for empty path");
            continue;
        }
        insert_path(&mut root, &parts, file_id);
    }
    sort_tree(&mut root);
    root
}

fn insert_path(node: &mut TreeNode, parts: &[&str], file_id: usize) {
    let TreeNode::Directory { children, .. } = node else {
        return;
    };
    let Some((name, rest)) = parts.split_first() else {
        return;
    };

    if rest.is_empty() {
        children.push(TreeNode::File {
            name: (*name).to_string(),
            file_id,
        });
        return;
    }

    let existing = children
        .iter()
        .position(|c| c.is_dir() && c.name() == *name);
    let idx = match existing {
        Some(idx) => idx,
        None => {
            children.push(TreeNode::Directory {
                name: (*name).to_string(),
                children: Vec::new(),
            });
            children.len() - 1
        }
    };
    insert_path(&mut children[idx], rest, file_id);
}

fn sort_tree(node: &mut TreeNode) {
    if let TreeNode::Directory { children, .. } = node {
        for child in children.iter_mut() {
            sort_tree(child);
        }
        children.sort_by(compare_nodes);
    }
}

fn compare_nodes(a: &TreeNode, b: &TreeNode) -> Ordering {
    match (a, b) {
        (TreeNode::Directory { .. }, TreeNode::File { .. }) => Ordering::Less,
        (TreeNode::File { .. }, TreeNode::Directory { .. }) => Ordering::Greater,
        (
            TreeNode::File {
                name: an,
                file_id: ai,
            },
            TreeNode::File {
                name: bn,
                file_id: bi,
            },
        ) => an.cmp(bn).then(ai.cmp(bi)),
        _ => a.name().cmp(b.name()),
    }
}
