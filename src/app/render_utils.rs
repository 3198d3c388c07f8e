use eframe::egui::{Color32, Mesh, Pos2, Rect, Shape};

use crate::colour::Rgb;
use crate::sunburst::{RADIAL_EXTENT, SegmentElement, polar};

#[derive(Clone, Copy, Debug)]
pub(super) struct SceneTransform {
    center: Pos2,
    scale: f32,
}

impl SceneTransform {
    pub(super) fn fit(rect: Rect) -> Self {
        let half_extent = rect.width().min(rect.height()) * 0.5 * 0.96;
        Self {
            center: rect.center(),
            scale: half_extent / RADIAL_EXTENT as f32,
        }
    }

    pub(super) fn to_screen(self, (x, y): (f64, f64)) -> Pos2 {
        Pos2::new(
            self.center.x + x as f32 * self.scale,
            self.center.y + y as f32 * self.scale,
        )
    }

    pub(super) fn to_scene(self, screen: Pos2) -> (f64, f64) {
        (
            ((screen.x - self.center.x) / self.scale) as f64,
            ((screen.y - self.center.y) / self.scale) as f64,
        )
    }

    pub(super) fn length(self, scene_length: f64) -> f32 {
        scene_length as f32 * self.scale
    }
}

pub(super) fn rgb_color(colour: Rgb) -> Color32 {
    Color32::from_rgb(colour.r, colour.g, colour.b)
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn fade(color: Color32, opacity: Option<f64>) -> Color32 {
    match opacity {
        Some(opacity) => color.gamma_multiply(opacity.clamp(0.0, 1.0) as f32),
        None => color,
    }
}

fn arc_steps(start_angle: f64, end_angle: f64, radius: f32) -> usize {
    let delta = (end_angle - start_angle).abs() as f32;
    ((delta * radius / 2.0).ceil() as usize).clamp(2, 320)
}

pub(super) fn sector_shape(transform: SceneTransform, segment: &SegmentElement, color: Color32) -> Shape {
    let sector = segment.sector;
    let steps = arc_steps(
        sector.start_angle,
        sector.end_angle,
        transform.length(sector.outer_radius),
    );

    let mut mesh = Mesh::default();
    let delta = sector.end_angle - sector.start_angle;
    for step in 0..=steps {
        let angle = sector.start_angle + delta * step as f64 / steps as f64;
        mesh.colored_vertex(transform.to_screen(polar(angle, sector.inner_radius)), color);
        mesh.colored_vertex(transform.to_screen(polar(angle, sector.outer_radius)), color);

        if step > 0 {
            let base = (2 * step) as u32;
            mesh.add_triangle(base - 2, base - 1, base);
            mesh.add_triangle(base - 1, base + 1, base);
        }
    }
    Shape::mesh(mesh)
}

pub(super) fn outer_arc_points(transform: SceneTransform, segment: &SegmentElement) -> Vec<Pos2> {
    let sector = segment.sector;
    let steps = arc_steps(
        sector.start_angle,
        sector.end_angle,
        transform.length(sector.outer_radius),
    );
    let delta = sector.end_angle - sector.start_angle;
    (0..=steps)
        .map(|step| {
            let angle = sector.start_angle + delta * step as f64 / steps as f64;
            transform.to_screen(polar(angle, sector.outer_radius))
        })
        .collect()
}
