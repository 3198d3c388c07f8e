use eframe::egui::{self, Align2, Color32, FontId, Sense, Shape, Stroke, Ui, vec2};

use crate::sunburst::NavSource;
use crate::util::format_count;

use super::super::ViewModel;
use super::super::render_utils::{
    SceneTransform, blend_color, fade, outer_arc_points, rgb_color, sector_shape,
};

const BACKGROUND: Color32 = Color32::from_rgb(250, 250, 250);
const SEPARATOR: Color32 = Color32::WHITE;
const LABEL: Color32 = Color32::from_gray(30);
const SELECTED: Color32 = Color32::from_rgb(40, 40, 40);

impl ViewModel {
    pub(in crate::app) fn draw_sunburst(&mut self, ui: &mut Ui, now: f64) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, BACKGROUND);

        if self.scene.is_empty() {
            ui.label("Nothing to draw yet.");
            return;
        }

        let transform = SceneTransform::fit(rect);
        let hovered = self.hovered_segment(ui, transform, &response);
        let pass = self.navigator.set_hover(hovered);
        self.queue(pass);

        let matches = self.fuzzy_matches();
        let selected = self.navigator.state().selected;

        for segment in &self.scene.segments {
            if !segment.visible {
                continue;
            }

            let mut color = rgb_color(segment.fill);
            if hovered == Some(segment.node) {
                color = blend_color(color, Color32::WHITE, 0.35);
            }
            if let Some(matches) = &matches
                && !matches.contains(&segment.node)
            {
                color = blend_color(color, BACKGROUND, 0.6);
            }
            let color = fade(color, segment.opacity);

            painter.add(sector_shape(transform, segment, color));
            let (width, stroke_color) = if selected == Some(segment.node) {
                (2.5, SELECTED)
            } else {
                (1.0, SEPARATOR)
            };
            painter.add(Shape::line(
                outer_arc_points(transform, segment),
                Stroke::new(width, fade(stroke_color, segment.opacity)),
            ));
        }

        for icon in &self.scene.icons {
            if !icon.visible {
                continue;
            }
            let radius = icon.placement.diameter / 2.0;
            let center = transform.to_screen((icon.placement.x + radius, icon.placement.y + radius));
            painter.circle_stroke(
                center,
                transform.length(radius),
                Stroke::new(1.5, fade(Color32::from_gray(90), icon.opacity)),
            );
        }

        for label in &self.scene.labels {
            if !label.visible {
                continue;
            }
            painter.text(
                transform.to_screen(label.anchor),
                Align2::CENTER_CENTER,
                label.text.as_str(),
                FontId::proportional(12.0),
                fade(LABEL, label.opacity),
            );
        }

        if let Some(index) = hovered {
            let node = self.navigator.tree().node(index);
            let mut panel_text = format!(
                "{}  |  {} taxa",
                self.node_label(index),
                format_count(node.child_count as u64)
            );
            if let Some(rank) = &node.rank {
                panel_text.push_str(&format!("  |  {rank}"));
            }
            if node.is_clickable() {
                ui.output_mut(|output| {
                    output.cursor_icon = egui::CursorIcon::PointingHand;
                });
            }
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(20),
            );
        }

        if response.clicked_by(egui::PointerButton::Primary)
            && let Some(index) = hovered
        {
            self.navigate(index, NavSource::User, now);
        }
    }
}
