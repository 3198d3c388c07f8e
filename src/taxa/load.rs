use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use super::overlay::Overlay;
use super::parse::parse_tree_document;
use super::tree::TaxonTree;

pub fn load_taxa(tree_path: &Path, overlay_path: Option<&Path>, resource_base: &str) -> Result<TaxonTree> {
    let started = Instant::now();

    let raw = fs::read_to_string(tree_path)
        .with_context(|| format!("failed to read tree document {}", tree_path.display()))?;
    let root = parse_tree_document(&raw)
        .with_context(|| format!("failed to parse tree document {}", tree_path.display()))?;
    let mut tree = TaxonTree::from_raw(&root).context("failed to index taxon tree")?;

    if let Some(overlay_path) = overlay_path {
        let raw = fs::read_to_string(overlay_path).with_context(|| {
            format!("failed to read metadata overlay {}", overlay_path.display())
        })?;
        let overlay = Overlay::from_json(&raw)
            .with_context(|| format!("failed to parse metadata overlay {}", overlay_path.display()))?;
        let matched = overlay
            .apply(&mut tree, resource_base)
            .context("failed to apply metadata overlay")?;
        info!(entries = overlay.len(), matched, "applied metadata overlay");
    }

    info!(
        nodes = tree.len(),
        max_depth = tree.max_depth(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "loaded taxon tree"
    );
    Ok(tree)
}
