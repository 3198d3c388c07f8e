use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::config::Config;
use crate::sunburst::{NavSource, Navigator, RenderPass, Scene, SceneStyle};
use crate::taxa::{TaxonTree, load_taxa};

pub fn export_svg(
    tree_path: &Path,
    overlay_path: Option<&Path>,
    config: &Config,
    layout: Option<&str>,
    output: &Path,
) -> Result<()> {
    let tree = load_taxa(tree_path, overlay_path, &config.resource_base)?;
    let (document, segments) = render_document(tree, config, layout)?;

    fs::write(output, document)
        .with_context(|| format!("failed to write SVG to {}", output.display()))?;
    info!(path = %output.display(), segments, "exported sunburst");
    Ok(())
}

/// Lays out `layout` (or the startup target) without animation and returns
/// the SVG document with its segment count.
fn render_document(tree: TaxonTree, config: &Config, layout: Option<&str>) -> Result<(String, usize)> {
    let config = Config {
        zoom_duration_ms: 0,
        ..config.clone()
    };
    let mut navigator = Navigator::new(tree, &config);
    navigator.start(config.query_on_startup.as_deref(), 0.0);

    if let Some(layout) = layout {
        if navigator.tree().lookup(layout).is_none() {
            bail!("unknown taxon id {layout:?}");
        }
        navigator.request(layout, NavSource::User, 0.0);
    }

    let style = SceneStyle::from_config(&config);
    let mut scene = Scene::default();
    navigator.render(RenderPass::Full, &mut scene, &style);
    let segments = scene.segments.iter().filter(|segment| segment.visible).count();
    Ok((scene.to_svg_document(), segments))
}
