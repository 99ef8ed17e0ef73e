//! Hierarchical wildcard listener registry.
//!
//! Active only in wildcard mode. Event names are split on the configured
//! delimiter and stored one tree level per segment; a search pattern may use
//! `*` as a full segment to match every child at that level.

use std::collections::HashMap;

use crate::listener::{Entry, Listener, Slot};

/// The pattern segment matching every child at its level.
pub(crate) const WILDCARD: &str = "*";

#[derive(Debug, Default)]
struct TreeNode {
    children: HashMap<String, TreeNode>,
    /// Listeners attached at exactly this path.
    terminal: Slot,
}

/// Delimiter-segmented index over wildcard-eligible registrations.
///
/// Nodes are never pruned on removal; an interior node may outlive its
/// terminal listeners.
#[derive(Debug, Default)]
pub(crate) struct ListenerTree {
    root: TreeNode,
}

impl ListenerTree {
    /// Walk or create one node per segment of `name` and attach `entry` to
    /// the final node's terminal slot, with the same promotion and
    /// leak-warning rules as the flat store. The caller validates `name`
    /// beforehand.
    pub(crate) fn insert(&mut self, name: &str, delimiter: &str, entry: Entry, max: usize) {
        let mut node = &mut self.root;
        for segment in name.split(delimiter) {
            node = node.children.entry(segment.to_owned()).or_default();
        }
        node.terminal.add(entry, max, name);
    }

    /// Collect every listener whose registration path matches `pattern`.
    ///
    /// A concrete segment matches only the identically named child; `*`
    /// descends into every child at that level. Overlapping matched paths
    /// yield their listeners independently, so the result may contain the
    /// same listener more than once.
    pub(crate) fn search(&self, pattern: &str, delimiter: &str) -> Vec<Listener> {
        let segments: Vec<&str> = pattern.split(delimiter).collect();
        search_node(&self.root, &segments)
    }
}

fn search_node(node: &TreeNode, segments: &[&str]) -> Vec<Listener> {
    let Some((head, rest)) = segments.split_first() else {
        return node.terminal.snapshot().unwrap_or_default();
    };
    if *head == WILDCARD {
        node.children
            .values()
            .flat_map(|child| search_node(child, rest))
            .collect()
    } else {
        node.children
            .get(*head)
            .map(|child| search_node(child, rest))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::{handler, same_listener};

    fn noop() -> Listener {
        handler(|_| {})
    }

    fn insert(tree: &mut ListenerTree, name: &str, listener: Listener) {
        tree.insert(name, ".", Entry::direct(listener), 10);
    }

    #[test]
    fn test_exact_path_match() {
        let mut tree = ListenerTree::default();
        let listener = noop();
        insert(&mut tree, "job.build.done", listener.clone());

        let found = tree.search("job.build.done", ".");
        assert_eq!(found.len(), 1);
        assert!(same_listener(&found[0], &listener));
    }

    #[test]
    fn test_interior_path_has_no_terminal() {
        let mut tree = ListenerTree::default();
        insert(&mut tree, "job.build.done", noop());

        assert!(tree.search("job.build", ".").is_empty());
        assert!(tree.search("job", ".").is_empty());
    }

    #[test]
    fn test_wildcard_segment_matches_every_child() {
        let mut tree = ListenerTree::default();
        insert(&mut tree, "job.build", noop());
        insert(&mut tree, "job.test", noop());
        insert(&mut tree, "ci.build", noop());

        assert_eq!(tree.search("job.*", ".").len(), 2);
        assert_eq!(tree.search("*.build", ".").len(), 2);
        assert_eq!(tree.search("*.*", ".").len(), 3);
    }

    #[test]
    fn test_concrete_segment_does_not_cross_names() {
        let mut tree = ListenerTree::default();
        insert(&mut tree, "job.build", noop());

        assert!(tree.search("job.test", ".").is_empty());
        assert!(tree.search("other.*", ".").is_empty());
    }

    #[test]
    fn test_overlapping_paths_duplicate_listener() {
        let mut tree = ListenerTree::default();
        let listener = noop();
        insert(&mut tree, "a.b", listener.clone());
        insert(&mut tree, "a.c", listener.clone());

        // One listener registered under two matched paths is reported twice.
        let found = tree.search("a.*", ".");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|l| same_listener(l, &listener)));
    }

    #[test]
    fn test_sequence_terminal_collects_all() {
        let mut tree = ListenerTree::default();
        insert(&mut tree, "a.b", noop());
        insert(&mut tree, "a.b", noop());
        insert(&mut tree, "a.b", noop());

        assert_eq!(tree.search("a.b", ".").len(), 3);
    }

    #[test]
    fn test_custom_delimiter() {
        let mut tree = ListenerTree::default();
        tree.insert("sys/disk/full", "/", Entry::direct(noop()), 10);

        assert_eq!(tree.search("sys/*/full", "/").len(), 1);
        // An unsplit pattern is a single unknown segment.
        assert!(tree.search("sys/disk/full", ".").is_empty());
    }
}
