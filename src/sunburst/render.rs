use std::collections::HashMap;
use std::f64::consts::TAU;
use std::fmt::Write as _;

use tracing::debug;

use crate::colour::Rgb;
use crate::config::ColourConfig;
use crate::taxa::TaxonTree;
use crate::util::escape_xml;

use super::geometry::{GeometryContext, IconPlacement, Sector};
use super::palette::ColourStrategy;
use super::scale::RADIAL_EXTENT;

pub fn segment_id(node_id: &str) -> String {
    format!("segment:{node_id}")
}

pub fn label_id(node_id: &str) -> String {
    format!("label:{node_id}")
}

pub fn label_path_id(node_id: &str) -> String {
    format!("label-path:{node_id}")
}

pub fn icon_id(node_id: &str) -> String {
    format!("icon:{node_id}")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Segment,
    Icon,
    Label,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ElementRef {
    layer: Layer,
    slot: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SegmentElement {
    pub id: String,
    pub node: usize,
    pub class: String,
    pub path: String,
    pub fill: Rgb,
    pub sector: Sector,
    pub visible: bool,
    pub opacity: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabelElement {
    pub id: String,
    pub path_id: String,
    pub node: usize,
    pub class: String,
    pub text: String,
    pub text_path: String,
    pub anchor: (f64, f64),
    pub visible: bool,
    pub opacity: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IconElement {
    pub id: String,
    pub node: usize,
    pub class: String,
    pub href: String,
    pub placement: IconPlacement,
    pub visible: bool,
    pub opacity: Option<f64>,
}

pub struct RenderContext<'a> {
    pub geometry: GeometryContext<'a>,
    pub colours: &'a ColourConfig,
    pub strategy: ColourStrategy,
    pub selected: Option<usize>,
    pub hovered: Option<usize>,
}

impl RenderContext<'_> {
    fn tree(&self) -> &TaxonTree {
        self.geometry.tree
    }

    fn drawn_nodes(&self) -> Vec<usize> {
        match self.geometry.old_window {
            Some(old_window) => old_window
                .union(self.geometry.window)
                .visible_indices()
                .collect(),
            None => self.geometry.window.visible_indices().collect(),
        }
    }

    fn class(&self, base: &str, node: usize) -> String {
        let mut class = base.to_owned();
        if self.tree().node(node).is_clickable() {
            class.push_str(" clickable");
        }
        if self.selected == Some(node) {
            class.push_str(" selected");
        }
        if self.hovered == Some(node) {
            class.push_str(" hovered");
        }
        class
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub segments: Vec<SegmentElement>,
    pub icons: Vec<IconElement>,
    pub labels: Vec<LabelElement>,
    by_id: HashMap<String, ElementRef>,
}

impl Scene {
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn segment(&self, node_id: &str) -> Option<&SegmentElement> {
        match self.by_id.get(&segment_id(node_id)) {
            Some(ElementRef {
                layer: Layer::Segment,
                slot,
            }) => self.segments.get(*slot),
            _ => None,
        }
    }

    fn slot(&self, element_id: &str, layer: Layer) -> Option<usize> {
        self.by_id
            .get(element_id)
            .filter(|element| element.layer == layer)
            .map(|element| element.slot)
    }

    /// Topmost visible segment under a polar point.
    pub fn hit_test(&self, angle: f64, radius: f64) -> Option<usize> {
        let angle = angle.rem_euclid(TAU);
        self.segments
            .iter()
            .rev()
            .filter(|segment| segment.visible && segment.opacity.is_none_or(|o| o > 0.0))
            .find(|segment| segment.sector.contains(angle, radius))
            .map(|segment| segment.node)
    }

    pub fn hit_test_point(&self, x: f64, y: f64) -> Option<usize> {
        self.hit_test((-y).atan2(x), x.hypot(y))
    }

    pub fn to_svg(&self) -> String {
        let mut out = String::from("<g class=\"sunburst\">\n");

        for segment in &self.segments {
            let _ = writeln!(
                out,
                "<path id=\"{}\" class=\"{}\" d=\"{}\" fill=\"{}\"{}/>",
                escape_xml(&segment.id),
                segment.class,
                segment.path,
                segment.fill,
                style_attrs(segment.visible, segment.opacity)
            );
        }

        for icon in &self.icons {
            let _ = writeln!(
                out,
                "<image id=\"{}\" class=\"{}\" href=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\"{}/>",
                escape_xml(&icon.id),
                icon.class,
                escape_xml(&icon.href),
                icon.placement.x,
                icon.placement.y,
                icon.placement.diameter,
                icon.placement.diameter,
                style_attrs(icon.visible, icon.opacity)
            );
        }

        for label in &self.labels {
            let path_id = escape_xml(&label.path_id);
            let _ = writeln!(
                out,
                "<path id=\"{path_id}\" d=\"{}\" fill=\"none\"/>",
                label.text_path
            );
            let _ = writeln!(
                out,
                "<text id=\"{}\" class=\"{}\"{}><textPath href=\"#{path_id}\" startOffset=\"50%\" text-anchor=\"middle\">{}</textPath></text>",
                escape_xml(&label.id),
                label.class,
                style_attrs(label.visible, label.opacity),
                escape_xml(&label.text)
            );
        }

        out.push_str("</g>\n");
        out
    }

    pub fn to_svg_document(&self) -> String {
        let extent = RADIAL_EXTENT;
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{} {} {} {}\">\n{}</svg>\n",
            -extent,
            -extent,
            2.0 * extent,
            2.0 * extent,
            self.to_svg()
        )
    }

    fn insert(&mut self, id: String, layer: Layer, slot: usize) {
        self.by_id.insert(id, ElementRef { layer, slot });
    }
}

fn style_attrs(visible: bool, opacity: Option<f64>) -> String {
    let mut attrs = String::new();
    if !visible {
        attrs.push_str(" visibility=\"hidden\"");
    }
    if let Some(opacity) = opacity {
        let _ = write!(attrs, " opacity=\"{:.3}\"", opacity.clamp(0.0, 1.0));
    }
    attrs
}

/// Rebuilds every element for the drawn nodes.
pub fn render_full(ctx: &RenderContext<'_>) -> Scene {
    let tree = ctx.tree();
    let mut scene = Scene::default();

    for index in ctx.drawn_nodes() {
        let node = tree.node(index);
        let geometry = ctx.geometry.segment(index);

        let id = segment_id(&node.id);
        scene.insert(id.clone(), Layer::Segment, scene.segments.len());
        scene.segments.push(SegmentElement {
            id,
            node: index,
            class: ctx.class("segment", index),
            path: geometry.path,
            fill: ctx.strategy.fill(tree, node, ctx.colours),
            sector: geometry.sector,
            visible: geometry.visible,
            opacity: geometry.opacity,
        });

        if let (Some(placement), Some(href)) = (geometry.icon, &node.icon_url) {
            let id = icon_id(&node.id);
            scene.insert(id.clone(), Layer::Icon, scene.icons.len());
            scene.icons.push(IconElement {
                id,
                node: index,
                class: ctx.class("icon", index),
                href: href.clone(),
                placement,
                visible: geometry.visible,
                opacity: geometry.opacity,
            });
        }

        let id = label_id(&node.id);
        scene.insert(id.clone(), Layer::Label, scene.labels.len());
        scene.labels.push(LabelElement {
            id,
            path_id: label_path_id(&node.id),
            node: index,
            class: ctx.class("label", index),
            text: geometry.label,
            text_path: geometry.text_path,
            anchor: geometry.sector.centroid(),
            visible: geometry.label_visible,
            opacity: geometry.opacity,
        });
    }

    debug!(elements = scene.len(), "full render");
    scene
}

/// Patches path data, visibility, class and colour of existing elements in
/// place. Nodes without an element are skipped; returns how many were patched.
pub fn render_light(ctx: &RenderContext<'_>, scene: &mut Scene) -> usize {
    let tree = ctx.tree();
    let mut patched = 0;

    for index in ctx.drawn_nodes() {
        let node = tree.node(index);
        let Some(slot) = scene.slot(&segment_id(&node.id), Layer::Segment) else {
            continue;
        };
        let geometry = ctx.geometry.segment(index);

        let segment = &mut scene.segments[slot];
        segment.class = ctx.class("segment", index);
        segment.path.clone_from(&geometry.path);
        segment.fill = ctx.strategy.fill(tree, node, ctx.colours);
        segment.sector = geometry.sector;
        segment.visible = geometry.visible;
        segment.opacity = geometry.opacity;

        if let (Some(slot), Some(placement)) =
            (scene.slot(&icon_id(&node.id), Layer::Icon), geometry.icon)
        {
            let icon = &mut scene.icons[slot];
            icon.class = ctx.class("icon", index);
            icon.placement = placement;
            icon.visible = geometry.visible;
            icon.opacity = geometry.opacity;
        }

        if let Some(slot) = scene.slot(&label_id(&node.id), Layer::Label) {
            let label = &mut scene.labels[slot];
            label.class = ctx.class("label", index);
            label.text = geometry.label;
            label.text_path = geometry.text_path;
            label.anchor = geometry.sector.centroid();
            label.visible = geometry.label_visible;
            label.opacity = geometry.opacity;
        }

        patched += 1;
    }

    patched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScaleConfig;
    use crate::sunburst::window::{WindowBounds, bound_nodes};
    use crate::taxa::tree::tests::small_tree;

    fn render_ctx<'a>(
        tree: &'a TaxonTree,
        bounds: &'a WindowBounds,
        colours: &'a ColourConfig,
        selected: Option<usize>,
    ) -> RenderContext<'a> {
        RenderContext {
            geometry: GeometryContext {
                tree,
                scale: &bounds.scale,
                window: &bounds.window,
                old_window: None,
                layout_root: 0,
                outer_depth: ScaleConfig::default().outer_depth,
                common_names: true,
            },
            colours,
            strategy: ColourStrategy::Undocumented,
            selected,
            hovered: None,
        }
    }

    #[test]
    fn full_render_is_idempotent() {
        let tree = small_tree();
        let bounds = bound_nodes(&tree, 0, &ScaleConfig::default());
        let colours = ColourConfig::default();
        let ctx = render_ctx(&tree, &bounds, &colours, None);

        let first = render_full(&ctx);
        let second = render_full(&ctx);
        assert_eq!(first, second);
        assert_eq!(first.to_svg(), second.to_svg());
        assert_eq!(first.segments.len(), 5);
        assert!(first.by_id.contains_key("segment:A1"));
        assert!(first.by_id.contains_key("label:A1"));
    }

    #[test]
    fn light_render_patches_without_creating_elements() {
        let tree = small_tree();
        let a = tree.lookup("A").unwrap();
        let colours = ColourConfig::default();

        let config = ScaleConfig {
            max_nodes: 4,
            ..ScaleConfig::default()
        };
        let shallow = bound_nodes(&tree, 0, &config);
        let mut scene = render_full(&render_ctx(&tree, &shallow, &colours, None));
        assert_eq!(scene.segments.len(), 3);

        let deep = bound_nodes(&tree, a, &ScaleConfig::default());
        let ctx = render_ctx(&tree, &deep, &colours, Some(a));
        let patched = render_light(&ctx, &mut scene);

        // A1 and A2 have no element yet, so only root and A are patched.
        assert_eq!(patched, 2);
        assert_eq!(scene.segments.len(), 3);
        assert!(scene.segment("A1").is_none());

        let fresh = render_full(&ctx);
        let a_segment = scene.segment("A").unwrap();
        assert_eq!(a_segment, fresh.segment("A").unwrap());
        assert!(a_segment.class.contains("selected"));
    }

    #[test]
    fn svg_export_escapes_labels_and_hides_collapsed_nodes() {
        let mut tree = small_tree();
        let b = tree.lookup("B").unwrap();
        tree.node_mut(b).name = "B & <co>".to_owned();
        tree.node_mut(b).common_name = None;
        let a = tree.lookup("A").unwrap();
        let bounds = bound_nodes(&tree, a, &ScaleConfig::default());
        let colours = ColourConfig::default();
        let mut ctx = render_ctx(&tree, &bounds, &colours, None);
        let old = bound_nodes(&tree, 0, &ScaleConfig::default()).window;
        ctx.geometry.old_window = Some(&old);

        let svg = render_full(&ctx).to_svg_document();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("viewBox=\"-1000 -1000 2000 2000\""));
        assert!(svg.contains("B &amp; &lt;co&gt;"));
        assert!(svg.contains("id=\"segment:B\""));
        assert!(svg.contains("visibility=\"hidden\""));
        assert!(svg.contains("href=\"#label-path:B\""));
    }

    #[test]
    fn hit_testing_finds_the_segment_under_a_point() {
        let tree = small_tree();
        let bounds = bound_nodes(&tree, 0, &ScaleConfig::default());
        let colours = ColourConfig::default();
        let scene = render_full(&render_ctx(&tree, &bounds, &colours, None));

        let a = tree.lookup("A").unwrap();
        let b = tree.lookup("B").unwrap();
        let ring = (bounds.scale.radius(1) + bounds.scale.radius(2)) / 2.0;

        assert_eq!(scene.hit_test(0.1, 1.0), Some(0));
        assert_eq!(scene.hit_test(0.1, ring), Some(a));
        assert_eq!(scene.hit_test(TAU * 0.7, ring), Some(b));
        assert_eq!(scene.hit_test(-TAU * 0.3, ring), Some(b));
        assert_eq!(scene.hit_test_point(ring, -1.0), Some(a));
        assert_eq!(scene.hit_test(0.1, 5_000.0), None);
    }
}
