use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::colour::Rgb;

use super::error::TaxaError;
use super::tree::TaxonTree;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayEntry {
    #[serde(default)]
    pub pic: Option<String>,
    #[serde(default)]
    pub taxon_pic: Option<String>,
    #[serde(default)]
    pub taxon_pic_description: Option<String>,
    #[serde(default)]
    pub colour: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct Overlay {
    entries: HashMap<String, OverlayEntry>,
}

struct ResolvedEntry {
    icon_url: Option<String>,
    picture_url: Option<String>,
    picture_caption: Option<String>,
    colours: Option<(Rgb, Rgb)>,
}

impl Overlay {
    pub fn from_json(raw: &str) -> Result<Self, TaxaError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn resolve(&self, resource_base: &str) -> Result<HashMap<&str, ResolvedEntry>, TaxaError> {
        let expand = |url: &Option<String>| {
            url.as_ref()
                .map(|url| url.replace("%resourceBase", resource_base))
        };

        self.entries
            .iter()
            .map(|(key, entry)| {
                let colours = entry
                    .colour
                    .as_deref()
                    .map(Rgb::from_hex)
                    .transpose()?
                    .map(Rgb::light_dark_pair);
                Ok((
                    key.as_str(),
                    ResolvedEntry {
                        icon_url: expand(&entry.pic),
                        picture_url: expand(&entry.taxon_pic),
                        picture_caption: entry.taxon_pic_description.clone(),
                        colours,
                    },
                ))
            })
            .collect()
    }

    /// Writes matched metadata onto the tree. A matched colour pair flows
    /// down the whole subtree; deeper matches are applied later and win.
    pub fn apply(&self, tree: &mut TaxonTree, resource_base: &str) -> Result<usize, TaxaError> {
        let resolved = self.resolve(resource_base)?;
        let mut matched = 0usize;

        for flat_index in 0..tree.len() {
            let node = tree.node(flat_index);
            let Some(rank) = node.rank.as_deref() else {
                continue;
            };
            let key = format!("{rank}:{}", node.name);
            let Some(entry) = resolved.get(key.as_str()) else {
                continue;
            };

            matched += 1;
            let node = tree.node_mut(flat_index);
            node.icon_url = entry.icon_url.clone();
            node.picture_url = entry.picture_url.clone();
            node.picture_caption = entry.picture_caption.clone();

            if let Some((low, high)) = entry.colours {
                colour_subtree(tree, flat_index, low, high);
            }
        }

        debug!(matched, entries = self.entries.len(), "applied metadata overlay");
        Ok(matched)
    }
}

fn colour_subtree(tree: &mut TaxonTree, root: usize, low: Rgb, high: Rgb) {
    let mut stack = vec![root];
    while let Some(flat_index) = stack.pop() {
        let node = tree.node_mut(flat_index);
        node.low_colour = Some(low);
        node.high_colour = Some(high);
        stack.extend(node.children.iter().copied());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxa::tree::tests::small_tree;

    #[test]
    fn colours_propagate_and_deeper_matches_override() {
        let mut tree = small_tree();
        let overlay = Overlay::from_json(
            r##"{
                "group:root": { "colour": "#3366cc", "pic": "%resourceBase/img/root.png" },
                "group:A": { "colour": "#cc3333", "taxonPicDescription": "A picture" },
                "group:missing": { "colour": "#000000" }
            }"##,
        )
        .unwrap();

        let matched = overlay.apply(&mut tree, "assets").unwrap();
        assert_eq!(matched, 2);

        let root_pair = Rgb::from_hex("#3366cc").unwrap().light_dark_pair();
        let a_pair = Rgb::from_hex("#cc3333").unwrap().light_dark_pair();
        let get = |id: &str| tree.node(tree.lookup(id).unwrap());

        assert_eq!(get("root").icon_url.as_deref(), Some("assets/img/root.png"));
        assert_eq!(get("B").low_colour, Some(root_pair.0));
        assert_eq!(get("A").high_colour, Some(a_pair.1));
        assert_eq!(get("A2").low_colour, Some(a_pair.0));
        assert_eq!(get("A").picture_caption.as_deref(), Some("A picture"));
    }

    #[test]
    fn invalid_colour_is_reported() {
        let mut tree = small_tree();
        let overlay = Overlay::from_json(r#"{ "group:A": { "colour": "purple" } }"#).unwrap();
        assert!(matches!(
            overlay.apply(&mut tree, ""),
            Err(TaxaError::InvalidColour(_))
        ));
    }
}
