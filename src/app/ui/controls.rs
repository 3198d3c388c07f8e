use eframe::egui::{self, Key, Ui};

use crate::config::ScaleConfig;
use crate::sunburst::{ColourStrategy, NavSource, RenderPass, search, suggestion_label};

use super::super::ViewModel;

const MAX_NODES_LIMIT: usize = 2_000;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui, now: f64) {
        ui.heading("Sunburst Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search (scientific or common name)")
            .on_hover_text("Pick a suggestion to zoom to that taxon.");
        let search_response = ui.text_edit_singleline(&mut self.search);
        let submitted =
            search_response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));
        search_response.on_hover_text("Matching segments in view are highlighted while typing.");

        let suggestions = search(
            self.navigator.tree(),
            &self.search,
            self.config.max_suggestions,
        );
        if submitted && let Some(&first) = suggestions.first() {
            self.navigate(first, NavSource::User, now);
        }

        if !suggestions.is_empty() {
            egui::ScrollArea::vertical()
                .id_salt("search_suggestions")
                .max_height(260.0)
                .show(ui, |ui| {
                    for index in suggestions {
                        let label = suggestion_label(self.navigator.tree().node(index));
                        if ui.link(label).clicked() {
                            self.navigate(index, NavSource::User, now);
                        }
                    }
                });
        } else if !self.search.trim().is_empty() {
            ui.small("No matching taxa.");
        }

        ui.separator();

        ui.label("Focus set (comma separated ids)")
            .on_hover_text("Stands in for a companion map: zooms to the common ancestor.");
        ui.text_edit_singleline(&mut self.focus_input);
        ui.horizontal(|ui| {
            if ui.button("Apply focus").clicked() {
                self.apply_focus(now);
            }
            if ui.button("Clear").clicked() {
                self.focus_input.clear();
                self.apply_focus(now);
            }
        });

        ui.separator();

        let mut restyled = ui
            .checkbox(&mut self.style.common_names, "Common names")
            .on_hover_text("Label segments with common names where known.")
            .changed();

        ui.horizontal_wrapped(|ui| {
            for strategy in [ColourStrategy::Undocumented, ColourStrategy::Observation] {
                restyled |= ui
                    .selectable_value(&mut self.style.strategy, strategy, strategy.label())
                    .changed();
            }
        });
        if restyled {
            self.fuzzy_match_cache = None;
            self.queue(RenderPass::Light);
        }

        let max_nodes_slider = ui
            .add(
                egui::Slider::new(&mut self.max_nodes, 2..=MAX_NODES_LIMIT)
                    .logarithmic(true)
                    .text("Max drawn taxa"),
            )
            .on_hover_text("Budget for the number of segments drawn below the layout root.");
        if max_nodes_slider.drag_stopped() || (max_nodes_slider.changed() && !max_nodes_slider.dragged())
        {
            let scale = ScaleConfig {
                max_nodes: self.max_nodes,
                ..self.navigator.scale_config().clone()
            };
            let pass = self.navigator.relayout(scale);
            self.queue(pass);
        }
    }
}
