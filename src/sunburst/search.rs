use crate::taxa::{TaxonNode, TaxonTree};
use crate::util::capitalize;

const NAME_OVERRIDES: &[(&str, &str)] = &[("Chromista", "Chromists")];

pub fn label_for_node(node: &TaxonNode, common_names: bool) -> String {
    if let Some((_, replacement)) = NAME_OVERRIDES.iter().find(|(name, _)| *name == node.name) {
        return (*replacement).to_owned();
    }

    let name = match &node.common_name {
        Some(common) if common_names && !common.is_empty() => common.as_str(),
        _ => node.name.as_str(),
    };
    capitalize(name)
}

pub fn display_label(node: &TaxonNode) -> String {
    let label = label_for_node(node, false);
    match &node.common_name {
        Some(common) if !common.is_empty() => format!("{label} ({common})"),
        _ => label,
    }
}

pub fn suggestion_label(node: &TaxonNode) -> String {
    let label = display_label(node);
    if node.child_count > 1 {
        format!("{label} ({} taxa)", node.child_count)
    } else {
        label
    }
}

/// Case-insensitive substring search over display labels in flat order.
pub fn search(tree: &TaxonTree, query: &str, max_suggestions: usize) -> Vec<usize> {
    let query = query.trim().to_lowercase();
    if query.is_empty() || max_suggestions == 0 {
        return Vec::new();
    }

    tree.nodes()
        .iter()
        .filter(|node| display_label(node).to_lowercase().contains(&query))
        .map(|node| node.flat_index)
        .take(max_suggestions)
        .collect()
}
