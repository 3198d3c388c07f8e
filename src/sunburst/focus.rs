use std::collections::HashSet;

use tracing::debug;

use crate::taxa::TaxonTree;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusOrigin {
    External,
    Navigation,
}

/// Recomputes every `focus_count`. An empty focus set emphasises everything.
pub fn update_focus_counts(tree: &mut TaxonTree, focus: &[usize]) {
    if focus.is_empty() {
        tree.reset_focus_counts();
        return;
    }

    let focused = focus.iter().copied().collect::<HashSet<_>>();
    for flat_index in (0..tree.len()).rev() {
        let node = tree.node(flat_index);
        let count = if focused.contains(&flat_index) {
            node.child_count
        } else {
            node.children
                .iter()
                .map(|&child| tree.node(child).focus_count)
                .sum()
        };
        tree.node_mut(flat_index).focus_count = count;
    }
}

pub fn lowest_common_ancestor(tree: &TaxonTree, focus: &[usize]) -> Option<usize> {
    let (first, rest) = focus.split_first()?;
    let first_path = tree.path_from_root(*first);
    let rest_paths = rest
        .iter()
        .map(|&node| tree.path_from_root(node))
        .collect::<Vec<_>>();

    first_path
        .iter()
        .enumerate()
        .take_while(|&(depth, ancestor)| {
            rest_paths
                .iter()
                .all(|path| path.get(depth) == Some(ancestor))
        })
        .map(|(_, &ancestor)| ancestor)
        .last()
}

/// Node to zoom to for a focus set: the root when empty, the parent of a
/// lone focused node, otherwise the lowest common ancestor.
pub fn focus_target(tree: &TaxonTree, focus: &[usize]) -> usize {
    let mut distinct = focus.to_vec();
    distinct.sort_unstable();
    distinct.dedup();

    let Some(lca) = lowest_common_ancestor(tree, &distinct) else {
        return 0;
    };
    let target = if distinct.len() == 1 {
        tree.node(lca).parent.unwrap_or(lca)
    } else {
        lca
    };
    debug!(
        focused = distinct.len(),
        target = %tree.node(target).id,
        "resolved focus target"
    );
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxa::tree::tests::small_tree;

    fn ids(tree: &TaxonTree, names: &[&str]) -> Vec<usize> {
        names.iter().map(|id| tree.lookup(id).unwrap()).collect()
    }

    #[test]
    fn empty_focus_emphasises_everything() {
        let mut tree = small_tree();
        let focus = ids(&tree, &["A1"]);
        update_focus_counts(&mut tree, &focus);
        update_focus_counts(&mut tree, &[]);
        assert!(tree.nodes().iter().all(|n| n.focus_count == n.child_count));
        assert_eq!(focus_target(&tree, &[]), 0);
    }

    #[test]
    fn focus_counts_sum_up_from_focused_nodes() {
        let mut tree = small_tree();
        let focus = ids(&tree, &["A1", "B"]);
        update_focus_counts(&mut tree, &focus);

        let count = |id: &str| tree.node(tree.lookup(id).unwrap()).focus_count;
        assert_eq!(count("A1"), 1);
        assert_eq!(count("A2"), 0);
        assert_eq!(count("A"), 1);
        assert_eq!(count("B"), 1);
        assert_eq!(count("root"), 2);
    }

    #[test]
    fn focused_internal_node_counts_its_whole_subtree() {
        let mut tree = small_tree();
        let focus = ids(&tree, &["A"]);
        update_focus_counts(&mut tree, &focus);
        assert_eq!(tree.node(focus[0]).focus_count, 3);
        assert_eq!(tree.root().focus_count, 3);
    }

    #[test]
    fn siblings_target_their_common_parent() {
        let tree = small_tree();
        let focus = ids(&tree, &["A1", "A2"]);
        assert_eq!(lowest_common_ancestor(&tree, &focus), tree.lookup("A"));
        assert_eq!(Some(focus_target(&tree, &focus)), tree.lookup("A"));
    }

    #[test]
    fn single_focus_targets_the_parent() {
        let tree = small_tree();
        let focus = ids(&tree, &["A1"]);
        assert_eq!(Some(focus_target(&tree, &focus)), tree.lookup("A"));
        assert_eq!(focus_target(&tree, &ids(&tree, &["A1", "A1"])), tree.lookup("A").unwrap());
        assert_eq!(focus_target(&tree, &[0]), 0);
    }

    #[test]
    fn distant_nodes_meet_at_the_root() {
        let tree = small_tree();
        let focus = ids(&tree, &["A2", "B"]);
        assert_eq!(lowest_common_ancestor(&tree, &focus), Some(0));
        assert_eq!(focus_target(&tree, &focus), 0);
    }
}
