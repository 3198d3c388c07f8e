use eframe::egui::{self, Align, Context, Layout};
use tracing::{debug, info};

use crate::config::Config;
use crate::sunburst::{
    FocusOrigin, NavEvent, NavSource, Navigator, RenderPass, Scene, SceneStyle, label_for_node,
};
use crate::taxa::TaxonTree;
use crate::util::format_count;

use super::super::{TaxaSource, ViewModel};

const APP_NAME: &str = "taxon-sunburst";

impl ViewModel {
    pub(in crate::app) fn new(tree: TaxonTree, config: Config) -> Self {
        Self {
            navigator: Navigator::new(tree, &config),
            style: SceneStyle::from_config(&config),
            scene: Scene::default(),
            max_nodes: config.scale.max_nodes,
            config,
            search: String::new(),
            focus_input: String::new(),
            pending_pass: RenderPass::None,
            started: false,
            scene_revision: 0,
            fuzzy_match_cache: None,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &TaxaSource,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        let now = ctx.input(|input| input.time);
        if !self.started {
            self.started = true;
            let pass = self
                .navigator
                .start(self.config.query_on_startup.as_deref(), now);
            self.queue(pass);
        }
        let pass = self.navigator.tick(now);
        self.queue(pass);
        self.flush(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(APP_NAME);
                    ui.separator();
                    let history = self.navigator.state().history();
                    let back_hint = match history.len().checked_sub(2).map(|i| history[i]) {
                        Some(previous) => format!("Back to {}", self.node_label(previous)),
                        None => "Nothing to go back to".to_owned(),
                    };
                    let back_button = ui
                        .add_enabled(self.navigator.can_go_back(), egui::Button::new("Back"))
                        .on_hover_text(back_hint);
                    if back_button.clicked() {
                        let pass = self.navigator.back(now);
                        self.queue(pass);
                    }
                    ui.label(format!("root: {}", self.node_label(0)));
                    ui.label(format!(
                        "layout: {}",
                        self.node_label(self.navigator.layout_root())
                    ));
                    ui.label(format!("tree: {}", source.tree.display()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload taxa"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "taxa: {}  visible: {}  depth: {}",
                            format_count(self.navigator.tree().len() as u64),
                            format_count(self.navigator.window().visible_count() as u64),
                            self.navigator.reached_depth()
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui, now));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui, now));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_sunburst(ui, now));

        if self.navigator.is_zooming() || self.pending_pass != RenderPass::None {
            ctx.request_repaint();
        }
    }

    pub(in crate::app) fn queue(&mut self, pass: RenderPass) {
        self.pending_pass = self.pending_pass.max(pass);
    }

    pub(in crate::app) fn navigate(&mut self, flat_index: usize, source: NavSource, now: f64) {
        let pass = self.navigator.request_index(flat_index, source, now);
        self.queue(pass);
    }

    pub(in crate::app) fn apply_focus(&mut self, now: f64) {
        let ids = self
            .focus_input
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
            .collect::<Vec<_>>();
        let pass = self.navigator.update_focus(&ids, FocusOrigin::External, now);
        self.queue(pass);
    }

    pub(in crate::app) fn node_label(&self, flat_index: usize) -> String {
        label_for_node(
            self.navigator.tree().node(flat_index),
            self.style.common_names,
        )
    }

    pub(in crate::app) fn render_pending(&mut self) {
        let pass = std::mem::take(&mut self.pending_pass);
        if pass == RenderPass::Full {
            self.scene_revision = self.scene_revision.wrapping_add(1);
        }
        self.navigator.render(pass, &mut self.scene, &self.style);
    }

    fn flush(&mut self, ctx: &Context) {
        self.render_pending();

        for event in self.navigator.drain_events() {
            match event {
                NavEvent::LayoutChanged(id) => {
                    info!(layout = %id, "layout changed");
                    let title = match self.navigator.tree().lookup(&id) {
                        Some(index) => format!("{} - {APP_NAME}", self.node_label(index)),
                        None => APP_NAME.to_owned(),
                    };
                    ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));
                }
                NavEvent::SelectionChanged(id) => debug!(selected = %id, "selection changed"),
            }
        }
    }
}
