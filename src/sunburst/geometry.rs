use std::f64::consts::{PI, TAU};

use crate::taxa::TaxonTree;

use super::scale::{RADIAL_EXTENT, ScaleState};
use super::search::label_for_node;
use super::window::VisibilityWindow;

const SAME_VALUE_EPSILON: f64 = 1e-9;
/// Offset applied to a start angle of exactly π, where some SVG
/// rasterisers mis-draw the arc.
const SINGULAR_ANGLE_NUDGE: f64 = 1e-4;
const LABEL_INSET: f64 = 18.0;
const OUTER_LABEL_MIN_LENGTH: f64 = 45.0;
const LABEL_LENGTH_PER_CHAR: f64 = 22.0;

fn same(a: f64, b: f64) -> bool {
    (a - b).abs() < SAME_VALUE_EPSILON
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sector {
    pub start_angle: f64,
    pub end_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl Sector {
    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }

    pub fn contains(&self, angle: f64, radius: f64) -> bool {
        radius >= self.inner_radius
            && radius < self.outer_radius
            && angle >= self.start_angle
            && angle < self.end_angle
    }

    pub fn is_full_turn(&self) -> bool {
        same(self.start_angle, 0.0) && same(self.end_angle, TAU)
    }

    pub fn centroid(&self) -> (f64, f64) {
        if self.is_full_turn() && same(self.inner_radius, 0.0) {
            return (0.0, 0.0);
        }
        polar(self.mid_angle(), (self.inner_radius + self.outer_radius) / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IconPlacement {
    pub x: f64,
    pub y: f64,
    pub diameter: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SegmentGeometry {
    pub sector: Sector,
    pub path: String,
    pub text_path: String,
    pub visible: bool,
    pub label_visible: bool,
    pub label: String,
    pub icon: Option<IconPlacement>,
    pub opacity: Option<f64>,
}

pub struct GeometryContext<'a> {
    pub tree: &'a TaxonTree,
    pub scale: &'a ScaleState,
    pub window: &'a VisibilityWindow,
    pub old_window: Option<&'a VisibilityWindow>,
    pub layout_root: usize,
    pub outer_depth: f64,
    pub common_names: bool,
}

impl GeometryContext<'_> {
    pub fn segment(&self, flat_index: usize) -> SegmentGeometry {
        let node = self.tree.node(flat_index);
        let left = self.scale.angle(node.left_index as f64);
        let right = self.scale.angle(node.right_index() as f64);
        let inner = self.scale.radius(node.depth);
        let outer = self.scale.radius(node.depth + 1);
        let sector = Sector {
            start_angle: left,
            end_angle: right,
            inner_radius: inner,
            outer_radius: outer,
        };

        let complete = sector.is_full_turn();
        let circle = complete && same(inner, 0.0);
        let visible = !same(left, right) && !same(inner, outer);
        let is_outer = same(outer - inner, self.outer_depth * RADIAL_EXTENT);
        let label = label_for_node(node, self.common_names);

        let outer_length = outer * (right - left);
        let label_fits = if is_outer {
            outer_length > OUTER_LABEL_MIN_LENGTH
        } else {
            outer_length > label.chars().count() as f64 * LABEL_LENGTH_PER_CHAR
        };

        let icon = node.icon_url.as_ref().map(|_| {
            let centred = circle || self.tree.is_on_root_chain(self.layout_root, flat_index);
            let mid_radius = if centred { 0.0 } else { (inner + outer) / 2.0 };
            let radius = outer - mid_radius;
            let (x, y) = polar(sector.mid_angle(), mid_radius);
            IconPlacement {
                x: x - radius,
                y: y - radius,
                diameter: 2.0 * radius,
            }
        });

        let path_left = if same(left, PI) {
            left + SINGULAR_ANGLE_NUDGE
        } else {
            left
        };
        let (path, text_path) = if complete {
            let path = if circle {
                circular_path(outer)
            } else {
                annular_path(inner, outer)
            };
            (path, circular_text_path(outer))
        } else {
            let text_path = if is_outer {
                radial_text_path(path_left, right, inner, outer)
            } else {
                arc_text_path(path_left, right, outer)
            };
            (segment_path(path_left, right, inner, outer), text_path)
        };

        let opacity = self.old_window.and_then(|old_window| {
            let was_visible = old_window.is_visible(flat_index);
            let is_visible = self.window.is_visible(flat_index);
            match (was_visible, is_visible) {
                (false, true) => Some(self.scale.zoom_progress),
                (true, false) => Some(1.0 - self.scale.zoom_progress),
                _ => None,
            }
        });

        SegmentGeometry {
            sector,
            path,
            text_path,
            visible,
            label_visible: visible && label_fits,
            label,
            icon,
            opacity,
        }
    }
}

/// Scene coordinates for an angle measured anticlockwise from +x.
pub fn polar(angle: f64, radius: f64) -> (f64, f64) {
    (radius * angle.cos(), -radius * angle.sin())
}

fn num(value: f64) -> String {
    if value.abs() < 0.005 {
        "0.00".to_owned()
    } else {
        format!("{value:.2}")
    }
}

fn point((x, y): (f64, f64)) -> String {
    format!("{} {}", num(x), num(y))
}

fn large_arc(left: f64, right: f64) -> u8 {
    u8::from(right - left > PI)
}

fn segment_path(left: f64, right: f64, inner: f64, outer: f64) -> String {
    let large = large_arc(left, right);
    let outer_arc = format!(
        "M {} A {} {} 0 {large} 0 {}",
        point(polar(left, outer)),
        num(outer),
        num(outer),
        point(polar(right, outer))
    );
    if same(inner, 0.0) {
        format!("{outer_arc} L 0.00 0.00 Z")
    } else {
        format!(
            "{outer_arc} L {} A {} {} 0 {large} 1 {} Z",
            point(polar(right, inner)),
            num(inner),
            num(inner),
            point(polar(left, inner))
        )
    }
}

fn circle_loop(radius: f64, sweep: u8) -> String {
    let r = num(radius);
    let neg = num(-radius);
    format!("M {r} 0.00 A {r} {r} 0 1 {sweep} {neg} 0.00 A {r} {r} 0 1 {sweep} {r} 0.00 Z")
}

fn circular_path(radius: f64) -> String {
    circle_loop(radius, 0)
}

fn annular_path(inner: f64, outer: f64) -> String {
    format!("{} {}", circle_loop(outer, 0), circle_loop(inner, 1))
}

fn circular_text_path(outer: f64) -> String {
    let radius = (outer - LABEL_INSET).max(0.0);
    format!(
        "M {} A {} {} 0 0 1 {}",
        point(polar(PI, radius)),
        num(radius),
        num(radius),
        point(polar(0.0, radius))
    )
}

fn arc_text_path(left: f64, right: f64, outer: f64) -> String {
    let radius = (outer - LABEL_INSET).max(0.0);
    let large = large_arc(left, right);
    let mid = (left + right) / 2.0;
    let (from, to, sweep) = if mid.sin() >= 0.0 {
        (right, left, 1)
    } else {
        (left, right, 0)
    };
    format!(
        "M {} A {} {} 0 {large} {sweep} {}",
        point(polar(from, radius)),
        num(radius),
        num(radius),
        point(polar(to, radius))
    )
}

fn radial_text_path(left: f64, right: f64, inner: f64, outer: f64) -> String {
    let mid = (left + right) / 2.0;
    let near = inner + LABEL_INSET;
    let far = (outer - LABEL_INSET).max(near);
    let (from, to) = if mid.cos() < 0.0 { (far, near) } else { (near, far) };
    format!(
        "M {} L {}",
        point(polar(mid, from)),
        point(polar(mid, to))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScaleConfig;
    use crate::sunburst::window::bound_nodes;
    use crate::taxa::tree::tests::small_tree;

    fn context<'a>(
        tree: &'a TaxonTree,
        scale: &'a ScaleState,
        window: &'a VisibilityWindow,
        old_window: Option<&'a VisibilityWindow>,
    ) -> GeometryContext<'a> {
        GeometryContext {
            tree,
            scale,
            window,
            old_window,
            layout_root: 0,
            outer_depth: ScaleConfig::default().outer_depth,
            common_names: true,
        }
    }

    #[test]
    fn global_root_is_a_full_circle() {
        let tree = small_tree();
        let bounds = bound_nodes(&tree, 0, &ScaleConfig::default());
        let geometry = context(&tree, &bounds.scale, &bounds.window, None).segment(0);

        assert!(geometry.visible);
        assert!(geometry.sector.is_full_turn());
        assert_eq!(geometry.path, circular_path(bounds.scale.radius(1)));
        assert_eq!(geometry.text_path, circular_text_path(bounds.scale.radius(1)));
        assert_eq!(geometry.sector.centroid(), (0.0, 0.0));
        assert!(geometry.opacity.is_none());
    }

    #[test]
    fn wide_segment_uses_the_large_arc_flag() {
        let tree = small_tree();
        let bounds = bound_nodes(&tree, 0, &ScaleConfig::default());
        let a = tree.lookup("A").unwrap();
        let geometry = context(&tree, &bounds.scale, &bounds.window, None).segment(a);

        // A covers 3 of 5 leaf units, more than half a turn.
        assert!(geometry.sector.end_angle - geometry.sector.start_angle > PI);
        assert!(geometry.path.starts_with("M "));
        assert!(geometry.path.contains(" 0 1 0 "));
        assert!(geometry.path.contains(" 0 1 1 "));
        assert!(geometry.path.ends_with(" Z"));
    }

    #[test]
    fn annulus_for_a_complete_ring_away_from_the_centre() {
        let tree = small_tree();
        let a = tree.lookup("A").unwrap();
        let bounds = bound_nodes(&tree, a, &ScaleConfig::default());
        let geometry = context(&tree, &bounds.scale, &bounds.window, None).segment(a);

        assert!(geometry.sector.is_full_turn());
        assert!(geometry.sector.inner_radius > 0.0);
        assert_eq!(
            geometry.path,
            annular_path(geometry.sector.inner_radius, geometry.sector.outer_radius)
        );
    }

    #[test]
    fn collapsed_interval_is_hidden() {
        let tree = small_tree();
        let a = tree.lookup("A").unwrap();
        let b = tree.lookup("B").unwrap();
        let bounds = bound_nodes(&tree, a, &ScaleConfig::default());
        let geometry = context(&tree, &bounds.scale, &bounds.window, None).segment(b);

        assert!(!geometry.visible);
        assert!(!geometry.label_visible);
    }

    #[test]
    fn start_angle_of_pi_is_nudged_in_the_path_only() {
        let tree = small_tree();
        let a2 = tree.lookup("A2").unwrap();
        let scale = ScaleState {
            left: 0.0,
            right: 2.0,
            radius_scale: vec![0.0, 100.0, 200.0, 300.0],
            zoom_progress: 0.0,
        };
        let window = VisibilityWindow::hidden(tree.len());
        let geometry = context(&tree, &scale, &window, None).segment(a2);

        assert_eq!(geometry.sector.start_angle, PI);
        let expected = format!("M {}", point(polar(PI + SINGULAR_ANGLE_NUDGE, 300.0)));
        assert!(geometry.path.starts_with(&expected));
    }

    #[test]
    fn entering_and_leaving_nodes_cross_fade() {
        let tree = small_tree();
        let a = tree.lookup("A").unwrap();
        let b = tree.lookup("B").unwrap();
        let a1 = tree.lookup("A1").unwrap();
        let config = ScaleConfig {
            max_nodes: 4,
            ..ScaleConfig::default()
        };
        let old = bound_nodes(&tree, 0, &config).window;
        let mut bounds = bound_nodes(&tree, a, &config);
        bounds.scale.zoom_progress = 0.25;
        let ctx = context(&tree, &bounds.scale, &bounds.window, Some(&old));

        assert_eq!(ctx.segment(a1).opacity, Some(0.25));
        assert_eq!(ctx.segment(b).opacity, Some(0.75));
        assert_eq!(ctx.segment(a).opacity, None);
    }

    #[test]
    fn label_needs_enough_arc_length() {
        let tree = small_tree();
        let scale = ScaleState {
            left: 0.0,
            right: 5000.0,
            radius_scale: vec![0.0, 100.0, 200.0, 300.0],
            zoom_progress: 0.0,
        };
        let window = VisibilityWindow::hidden(tree.len());
        let ctx = context(&tree, &scale, &window, None);
        let a1 = tree.lookup("A1").unwrap();
        assert!(ctx.segment(a1).visible);
        assert!(!ctx.segment(a1).label_visible);

        let wide = ScaleState {
            right: 1.0,
            ..scale.clone()
        };
        let ctx = context(&tree, &wide, &window, None);
        let geometry = ctx.segment(a1);
        assert!(geometry.label_visible);
    }

    #[test]
    fn sector_hit_testing() {
        let sector = Sector {
            start_angle: 0.5,
            end_angle: 1.5,
            inner_radius: 10.0,
            outer_radius: 20.0,
        };
        assert!(sector.contains(1.0, 15.0));
        assert!(!sector.contains(1.0, 25.0));
        assert!(!sector.contains(2.0, 15.0));
    }
}
