use eframe::egui::{self, RichText, Ui};

use crate::sunburst::NavSource;
use crate::util::format_count;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui, now: f64) {
        ui.heading("Taxon Details");
        ui.add_space(6.0);

        let Some(selected) = self.navigator.state().selected else {
            ui.label("Click a segment or pick a search result.");
            return;
        };

        let tree = self.navigator.tree();
        let node = tree.node(selected);
        let title = self.node_label(selected);

        ui.label(RichText::new(title).strong());
        ui.small(node.id.as_str());
        ui.add_space(6.0);

        if let Some(rank) = &node.rank {
            ui.label(format!("Rank: {rank}"));
        }
        ui.label(format!("Scientific name: {}", node.name));
        if let Some(common_name) = &node.common_name {
            ui.label(format!("Common name: {common_name}"));
        }
        let on_screen = self
            .scene
            .segment(&node.id)
            .is_some_and(|segment| segment.visible);
        ui.label(if on_screen { "In view" } else { "Out of view" });
        ui.label(format!("Taxa in subtree: {}", format_count(node.child_count as u64)));
        ui.label(format!("Direct children: {}", node.children.len()));
        ui.label(format!("Observations: {}", format_count(node.observation_count)));
        ui.label(format!(
            "Undocumented taxa: {}",
            format_count(node.undocumented_count)
        ));
        if !self.navigator.state().row_focus.is_empty() {
            ui.label(format!(
                "Focused taxa: {} of {}",
                format_count(node.focus_count as u64),
                format_count(node.child_count as u64)
            ));
        }

        if let Some(summary) = &node.summary {
            ui.separator();
            ui.label(RichText::new("Summary").strong());
            egui::ScrollArea::vertical()
                .id_salt("summary_scroll")
                .max_height(180.0)
                .show(ui, |ui| ui.label(summary.as_str()));
        }

        if let Some(picture) = &node.picture_url {
            ui.separator();
            ui.label(RichText::new("Reference picture").strong());
            ui.hyperlink(picture.as_str());
            if let Some(caption) = &node.picture_caption {
                ui.small(caption.as_str());
            }
        }
        if let Some(image) = &node.image_url {
            ui.hyperlink_to("iNaturalist image", image.as_str());
        }

        ui.separator();
        ui.label(RichText::new("Path from root").strong());
        let path = tree.path_from_root(selected);
        let mut pending_navigation = None;
        for (depth, &ancestor) in path.iter().enumerate() {
            let label = format!("{}{}", "  ".repeat(depth), self.node_label(ancestor));
            let response = if ancestor == selected {
                ui.label(label)
            } else {
                ui.link(label)
            };
            if response.clicked() {
                pending_navigation = Some(ancestor);
            }
        }

        if let Some(ancestor) = pending_navigation {
            self.navigate(ancestor, NavSource::User, now);
        }
    }
}
