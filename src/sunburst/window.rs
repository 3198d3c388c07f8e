use tracing::debug;

use crate::config::ScaleConfig;
use crate::taxa::TaxonTree;

use super::radius::radius_scale;
use super::scale::ScaleState;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibilityWindow {
    visible: Vec<bool>,
}

impl VisibilityWindow {
    pub fn hidden(len: usize) -> Self {
        Self {
            visible: vec![false; len],
        }
    }

    pub fn is_visible(&self, flat_index: usize) -> bool {
        self.visible.get(flat_index).copied().unwrap_or(false)
    }

    fn show(&mut self, flat_index: usize) {
        if let Some(slot) = self.visible.get_mut(flat_index) {
            *slot = true;
        }
    }

    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|&&visible| visible).count()
    }

    pub fn visible_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.visible
            .iter()
            .enumerate()
            .filter_map(|(index, &visible)| visible.then_some(index))
    }

    pub fn union(&self, other: &VisibilityWindow) -> VisibilityWindow {
        let len = self.visible.len().max(other.visible.len());
        VisibilityWindow {
            visible: (0..len)
                .map(|index| self.is_visible(index) || other.is_visible(index))
                .collect(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct WindowBounds {
    pub window: VisibilityWindow,
    pub reached_depth: usize,
    pub scale: ScaleState,
}

/// Picks the nodes to draw for `layout_root`: its whole ancestor chain, then
/// whole depth levels below it for as long as the running total stays under
/// `max_nodes`.
pub fn bound_nodes(tree: &TaxonTree, layout_root: usize, config: &ScaleConfig) -> WindowBounds {
    let mut window = VisibilityWindow::hidden(tree.len());
    for ancestor in tree.ancestors(layout_root) {
        window.show(ancestor);
    }

    let root = tree.node(layout_root);
    let mut total_nodes = 1usize;
    let mut frontier = vec![layout_root];
    let mut depth = root.depth;

    while depth < tree.max_depth() {
        let direct_children = frontier
            .iter()
            .map(|&parent| tree.node(parent).children.len())
            .sum::<usize>();
        if direct_children == 0 || total_nodes + direct_children >= config.max_nodes {
            break;
        }

        let mut next_frontier = Vec::with_capacity(direct_children);
        for &parent in &frontier {
            for &child in &tree.node(parent).children {
                window.show(child);
                next_frontier.push(child);
            }
        }
        frontier = next_frontier;
        total_nodes += direct_children;
        depth += 1;
    }

    let at_root = layout_root == 0;
    let radius_scale = radius_scale(
        root.depth,
        depth + 1,
        tree.max_depth() + 1,
        config,
        at_root,
    );
    debug!(
        layout_root = %root.id,
        reached_depth = depth,
        total_nodes,
        "bounded visible nodes"
    );

    WindowBounds {
        window,
        reached_depth: depth,
        scale: ScaleState {
            left: root.left_index as f64,
            right: root.right_index() as f64,
            radius_scale,
            zoom_progress: 0.0,
        },
    }
}
