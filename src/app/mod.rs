use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};

use crate::config::Config;
use crate::sunburst::{Navigator, RenderPass, Scene, SceneStyle};
use crate::taxa::{TaxonTree, load_taxa};

mod canvas;
mod render_utils;
mod ui;

#[derive(Clone, Debug)]
pub struct TaxaSource {
    pub tree: PathBuf,
    pub overlay: Option<PathBuf>,
}

pub struct SunburstApp {
    source: TaxaSource,
    config: Config,
    state: AppState,
    reload_rx: Option<Receiver<Result<TaxonTree, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<TaxonTree, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    navigator: Navigator,
    style: SceneStyle,
    scene: Scene,
    config: Config,
    max_nodes: usize,
    search: String,
    focus_input: String,
    pending_pass: RenderPass,
    started: bool,
    scene_revision: u64,
    fuzzy_match_cache: Option<FuzzyMatchCache>,
}

struct FuzzyMatchCache {
    query: String,
    scene_revision: u64,
    layout_root: usize,
    common_names: bool,
    matches: Arc<HashSet<usize>>,
}

impl SunburstApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, source: TaxaSource, config: Config) -> Self {
        let state = Self::start_load(&source, &config);
        Self {
            source,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: &TaxaSource, config: &Config) -> Receiver<Result<TaxonTree, String>> {
        let (tx, rx) = mpsc::channel();
        let source = source.clone();
        let resource_base = config.resource_base.clone();

        thread::spawn(move || {
            let result = load_taxa(&source.tree, source.overlay.as_deref(), &resource_base)
                .map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: &TaxaSource, config: &Config) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source, config),
        }
    }

    fn ready(&self, tree: TaxonTree) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(tree, self.config.clone())))
    }
}

impl eframe::App for SunburstApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading taxonomy...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the taxonomy");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    self.state = Self::start_load(&self.source, &self.config);
                    return;
                }
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.source, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(&self.source, &self.config));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(result),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = match result {
                Ok(tree) => self.ready(tree),
                Err(error) => AppState::Error(error),
            };
        }
    }
}
