use std::collections::HashMap;

use tracing::debug;

use crate::colour::Rgb;

use super::error::TaxaError;
use super::parse::RawTaxon;

#[derive(Clone, Debug)]
pub struct TaxonNode {
    pub id: String,
    pub rank: Option<String>,
    pub name: String,
    pub common_name: Option<String>,
    pub children: Vec<usize>,
    pub parent: Option<usize>,
    pub depth: usize,
    /// Size of the subtree rooted here, including the node itself.
    pub child_count: usize,
    pub flat_index: usize,
    pub left_index: usize,
    pub low_colour: Option<Rgb>,
    pub high_colour: Option<Rgb>,
    pub observation_count: u64,
    pub undocumented_count: u64,
    pub focus_count: usize,
    pub image_url: Option<String>,
    pub summary: Option<String>,
    pub icon_url: Option<String>,
    pub picture_url: Option<String>,
    pub picture_caption: Option<String>,
}

impl TaxonNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn right_index(&self) -> usize {
        self.left_index + self.child_count
    }

    pub fn is_clickable(&self) -> bool {
        !self.children.is_empty() || self.image_url.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct TaxonTree {
    nodes: Vec<TaxonNode>,
    index: HashMap<String, usize>,
    max_depth: usize,
}

struct Visit<'a> {
    raw: &'a RawTaxon,
    parent: Option<usize>,
    depth: usize,
}

impl TaxonTree {
    pub fn from_raw(root: &RawTaxon) -> Result<Self, TaxaError> {
        let visits = pre_order(root);

        // Stable sort keeps pre-order among nodes of equal depth.
        let mut order = (0..visits.len()).collect::<Vec<_>>();
        order.sort_by_key(|&visit| visits[visit].depth);

        let mut flat_of_visit = vec![0usize; visits.len()];
        for (flat_index, &visit) in order.iter().enumerate() {
            flat_of_visit[visit] = flat_index;
        }

        let mut nodes = Vec::with_capacity(visits.len());
        let mut index = HashMap::with_capacity(visits.len());
        for (flat_index, &visit_index) in order.iter().enumerate() {
            let visit = &visits[visit_index];
            let raw = visit.raw;
            if index.insert(raw.id.clone(), flat_index).is_some() {
                return Err(TaxaError::DuplicateId(raw.id.clone()));
            }

            nodes.push(TaxonNode {
                id: raw.id.clone(),
                rank: raw.rank.clone(),
                name: raw.name.clone(),
                common_name: raw.common_name.clone(),
                children: Vec::with_capacity(raw.children.len()),
                parent: visit.parent.map(|parent| flat_of_visit[parent]),
                depth: visit.depth,
                child_count: 1,
                flat_index,
                left_index: 0,
                low_colour: None,
                high_colour: None,
                observation_count: raw.observation_count,
                undocumented_count: raw.undocumented_count,
                focus_count: 1,
                image_url: raw.image_url.clone(),
                summary: raw.wikipedia_summary.clone(),
                icon_url: None,
                picture_url: None,
                picture_caption: None,
            });
        }

        for visit in &visits {
            if let Some(parent) = visit.parent {
                let child = index[&visit.raw.id];
                nodes[flat_of_visit[parent]].children.push(child);
            }
        }

        let max_depth = nodes.last().map_or(0, |node| node.depth);
        let mut tree = Self {
            nodes,
            index,
            max_depth,
        };
        tree.compute_child_counts();
        tree.layout();
        tree.reset_focus_counts();
        debug!(
            nodes = tree.nodes.len(),
            max_depth = tree.max_depth,
            "indexed taxon tree"
        );
        Ok(tree)
    }

    fn compute_child_counts(&mut self) {
        for flat_index in (0..self.nodes.len()).rev() {
            let count = 1 + self.nodes[flat_index]
                .children
                .iter()
                .map(|&child| self.nodes[child].child_count)
                .sum::<usize>();
            self.nodes[flat_index].child_count = count;
        }
    }

    fn layout(&mut self) {
        if let Some(root) = self.nodes.first_mut() {
            root.left_index = 0;
        }

        for flat_index in 0..self.nodes.len() {
            let mut running_left = self.nodes[flat_index].left_index;
            for slot in 0..self.nodes[flat_index].children.len() {
                let child = self.nodes[flat_index].children[slot];
                self.nodes[child].left_index = running_left;
                running_left += self.nodes[child].child_count;
            }
        }
    }

    pub fn reset_focus_counts(&mut self) {
        for node in &mut self.nodes {
            node.focus_count = node.child_count;
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self) -> &TaxonNode {
        &self.nodes[0]
    }

    pub fn nodes(&self) -> &[TaxonNode] {
        &self.nodes
    }

    pub fn node(&self, flat_index: usize) -> &TaxonNode {
        &self.nodes[flat_index]
    }

    pub(crate) fn node_mut(&mut self, flat_index: usize) -> &mut TaxonNode {
        &mut self.nodes[flat_index]
    }

    pub fn lookup(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn ancestors(&self, flat_index: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(flat_index), |&current| self.nodes[current].parent)
    }

    pub fn path_from_root(&self, flat_index: usize) -> Vec<usize> {
        let mut path = self.ancestors(flat_index).collect::<Vec<_>>();
        path.reverse();
        path
    }

    pub fn is_on_root_chain(&self, layout_root: usize, flat_index: usize) -> bool {
        self.ancestors(layout_root).any(|ancestor| ancestor == flat_index)
    }
}

fn pre_order(root: &RawTaxon) -> Vec<Visit<'_>> {
    let mut visits = Vec::new();
    let mut stack = vec![Visit {
        raw: root,
        parent: None,
        depth: 0,
    }];

    while let Some(visit) = stack.pop() {
        let visit_index = visits.len();
        let depth = visit.depth;
        let raw = visit.raw;
        visits.push(visit);
        for child in raw.children.iter().rev() {
            stack.push(Visit {
                raw: child,
                parent: Some(visit_index),
                depth: depth + 1,
            });
        }
    }

    visits
}

#[cfg(test)]
pub(crate) mod tests {
    use proptest::prelude::*;

    use super::*;

    pub(crate) fn raw(id: &str, children: Vec<RawTaxon>) -> RawTaxon {
        RawTaxon {
            id: id.to_owned(),
            name: id.to_owned(),
            rank: (!children.is_empty()).then(|| "group".to_owned()),
            children,
            ..RawTaxon::default()
        }
    }

    /// root(children=[A,B]), A(children=[A1,A2])
    pub(crate) fn small_tree() -> TaxonTree {
        let root = raw(
            "root",
            vec![
                raw("A", vec![raw("A1", vec![]), raw("A2", vec![])]),
                raw("B", vec![]),
            ],
        );
        TaxonTree::from_raw(&root).unwrap()
    }

    fn field(tree: &TaxonTree, id: &str, f: fn(&TaxonNode) -> usize) -> usize {
        f(tree.node(tree.lookup(id).unwrap()))
    }

    #[test]
    fn small_tree_counts_and_intervals() {
        let tree = small_tree();
        let count = |id| field(&tree, id, |n| n.child_count);
        let left = |id| field(&tree, id, |n| n.left_index);

        assert_eq!(
            ["root", "A", "B", "A1", "A2"].map(count),
            [5, 3, 1, 1, 1]
        );
        assert_eq!(left("root"), 0);
        assert_eq!(left("A"), 0);
        assert_eq!(left("B"), 3);
        assert_eq!(left("A1"), 0);
        assert_eq!(left("A2"), 1);
    }

    #[test]
    fn flat_order_is_depth_sorted_with_back_references() {
        let tree = small_tree();
        let ids = tree.nodes().iter().map(|n| n.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["root", "A", "B", "A1", "A2"]);
        assert_eq!(tree.max_depth(), 2);

        let a2 = tree.lookup("A2").unwrap();
        assert_eq!(tree.node(a2).flat_index, a2);
        assert_eq!(
            tree.path_from_root(a2)
                .into_iter()
                .map(|i| tree.node(i).id.as_str())
                .collect::<Vec<_>>(),
            ["root", "A", "A2"]
        );
        assert!(tree.is_on_root_chain(a2, tree.lookup("A").unwrap()));
        assert!(!tree.is_on_root_chain(a2, tree.lookup("B").unwrap()));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let root = raw("root", vec![raw("x", vec![]), raw("x", vec![])]);
        assert!(matches!(
            TaxonTree::from_raw(&root),
            Err(TaxaError::DuplicateId(id)) if id == "x"
        ));
    }

    #[test]
    fn single_node_tree_is_its_own_interval() {
        let tree = TaxonTree::from_raw(&raw("only", vec![])).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root().child_count, 1);
        assert_eq!(tree.root().right_index(), 1);
        assert_eq!(tree.max_depth(), 0);
    }

    pub(crate) fn arb_tree() -> impl Strategy<Value = RawTaxon> {
        let leaf = Just(()).prop_map(|_| RawTaxon::default());
        leaf.prop_recursive(5, 120, 5, |inner| {
            prop::collection::vec(inner, 0..5).prop_map(|children| RawTaxon {
                children,
                ..RawTaxon::default()
            })
        })
        .prop_map(|mut root| {
            let mut next = 0usize;
            assign_ids(&mut root, &mut next);
            root
        })
    }

    fn assign_ids(node: &mut RawTaxon, next: &mut usize) {
        node.id = format!("t{next}");
        node.name = node.id.clone();
        *next += 1;
        for child in &mut node.children {
            assign_ids(child, next);
        }
    }

    proptest! {
        #[test]
        fn children_tile_their_parent_interval(raw_root in arb_tree()) {
            let tree = TaxonTree::from_raw(&raw_root).unwrap();
            for node in tree.nodes() {
                let child_sum = node
                    .children
                    .iter()
                    .map(|&c| tree.node(c).child_count)
                    .sum::<usize>();
                prop_assert_eq!(child_sum + 1, node.child_count);

                for pair in node.children.windows(2) {
                    let first = tree.node(pair[0]);
                    prop_assert_eq!(first.right_index(), tree.node(pair[1]).left_index);
                }
                for &child in &node.children {
                    let child = tree.node(child);
                    prop_assert!(node.left_index <= child.left_index);
                    prop_assert!(child.left_index < node.right_index());
                    prop_assert!(child.right_index() <= node.right_index());
                    prop_assert_eq!(child.depth, node.depth + 1);
                    prop_assert!(child.flat_index > node.flat_index);
                }
            }
        }
    }
}
