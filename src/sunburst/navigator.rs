use tracing::{debug, info, warn};

use crate::config::{ColourConfig, Config, ScaleConfig};
use crate::taxa::TaxonTree;

use super::easing::Easing;
use super::focus::{FocusOrigin, focus_target, update_focus_counts};
use super::geometry::GeometryContext;
use super::palette::ColourStrategy;
use super::render::{RenderContext, Scene, render_full, render_light};
use super::scale::ScaleState;
use super::search::search;
use super::window::{VisibilityWindow, bound_nodes};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavSource {
    User,
    History,
    Focus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavEvent {
    LayoutChanged(String),
    SelectionChanged(String),
}

/// Render work a state change calls for. Ordered so passes can be merged
/// with `max`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum RenderPass {
    #[default]
    None,
    Light,
    Full,
}

#[derive(Clone, Debug, Default)]
pub struct NavigationState {
    /// Committed root of the static layout; `None` before the first commit.
    pub layout_root: Option<usize>,
    pub selected: Option<usize>,
    pub hovered: Option<usize>,
    pub row_focus: Vec<usize>,
    history: Vec<usize>,
    history_index: usize,
}

impl NavigationState {
    pub fn history(&self) -> &[usize] {
        &self.history[..self.history_index]
    }

    fn push_history(&mut self, target: usize, limit: usize) {
        self.history.truncate(self.history_index);
        if self.history.last() == Some(&target) {
            return;
        }
        self.history.push(target);
        if limit > 0 && self.history.len() > limit {
            let overflow = self.history.len() - limit;
            self.history.drain(..overflow);
        }
        self.history_index = self.history.len();
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneStyle {
    pub colours: ColourConfig,
    pub strategy: ColourStrategy,
    pub common_names: bool,
}

impl SceneStyle {
    pub fn from_config(config: &Config) -> Self {
        Self {
            colours: config.colours.clone(),
            strategy: config.colour_count,
            common_names: config.common_names,
        }
    }
}

#[derive(Debug)]
struct ZoomTask {
    target: usize,
    from: ScaleState,
    to: ScaleState,
    old_window: VisibilityWindow,
    started_at: f64,
}

#[derive(Debug, Default)]
enum Phase {
    #[default]
    Idle,
    Zooming(ZoomTask),
}

fn startup_match(tree: &TaxonTree, query: &str) -> Option<usize> {
    search(tree, query, 1).first().copied()
}

#[derive(Debug)]
pub struct Navigator {
    tree: TaxonTree,
    scale_config: ScaleConfig,
    zoom_duration: f64,
    easing: Easing,
    history_limit: usize,
    state: NavigationState,
    scale: ScaleState,
    window: VisibilityWindow,
    reached_depth: usize,
    phase: Phase,
    events: Vec<NavEvent>,
}

impl Navigator {
    pub fn new(tree: TaxonTree, config: &Config) -> Self {
        let window = VisibilityWindow::hidden(tree.len());
        Self {
            tree,
            scale_config: config.scale.clone(),
            zoom_duration: config.zoom_duration_secs(),
            easing: config.easing,
            history_limit: config.history_limit,
            state: NavigationState::default(),
            scale: ScaleState::default(),
            window,
            reached_depth: 0,
            phase: Phase::Idle,
            events: Vec::new(),
        }
    }

    /// Commits the first layout: the first match for `query`, else the root.
    pub fn start(&mut self, query: Option<&str>, now: f64) -> RenderPass {
        let matched = query.and_then(|query| startup_match(&self.tree, query));
        if let Some(query) = query
            && matched.is_none()
        {
            warn!(query, "startup query matched nothing, showing the root");
        }
        self.request_index(matched.unwrap_or(0), NavSource::User, now)
    }

    pub fn request(&mut self, id: &str, source: NavSource, now: f64) -> RenderPass {
        match self.tree.lookup(id) {
            Some(index) => self.request_index(index, source, now),
            None => {
                debug!(id, "navigation to unknown id ignored");
                RenderPass::None
            }
        }
    }

    pub fn request_index(&mut self, requested: usize, source: NavSource, now: f64) -> RenderPass {
        self.select(Some(requested));

        let committed = self.state.layout_root;
        let destination = self.zoom_target().or(committed);
        let node = self.tree.node(requested);
        let target = if node.is_leaf() {
            destination.or(node.parent).unwrap_or(requested)
        } else {
            requested
        };

        if source == NavSource::User {
            self.state.push_history(target, self.history_limit);
        }

        match committed {
            None => {
                self.commit(target);
                RenderPass::Full
            }
            Some(_) if destination == Some(target) && source == NavSource::User => {
                RenderPass::Light
            }
            Some(_) => self.begin_zoom(target, now),
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.state.history_index >= 2
    }

    pub fn back(&mut self, now: f64) -> RenderPass {
        if !self.can_go_back() {
            return RenderPass::None;
        }
        self.state.history_index -= 1;
        let target = self.state.history[self.state.history_index - 1];
        self.request_index(target, NavSource::History, now)
    }

    pub fn tick(&mut self, now: f64) -> RenderPass {
        let Phase::Zooming(task) = &self.phase else {
            return RenderPass::None;
        };

        let elapsed = now - task.started_at;
        let t = if self.zoom_duration > 0.0 {
            elapsed / self.zoom_duration
        } else {
            1.0
        };
        if t >= 1.0 {
            let target = task.target;
            self.commit(target);
            return RenderPass::Full;
        }

        let progress = self.easing.apply(t);
        self.scale = task.from.interpolate(&task.to, progress);
        RenderPass::Light
    }

    pub fn set_hover(&mut self, hovered: Option<usize>) -> RenderPass {
        if self.state.hovered == hovered {
            return RenderPass::None;
        }
        self.state.hovered = hovered;
        RenderPass::Light
    }

    pub fn select(&mut self, selected: Option<usize>) -> RenderPass {
        if self.state.selected == selected {
            return RenderPass::None;
        }
        self.state.selected = selected;
        if let Some(index) = selected {
            self.events
                .push(NavEvent::SelectionChanged(self.tree.node(index).id.clone()));
        }
        RenderPass::Light
    }

    pub fn relayout(&mut self, scale_config: ScaleConfig) -> RenderPass {
        self.scale_config = scale_config;
        let target = match &self.phase {
            Phase::Zooming(task) => Some(task.target),
            Phase::Idle => self.state.layout_root,
        };
        match target {
            Some(target) => {
                self.commit(target);
                RenderPass::Full
            }
            None => RenderPass::None,
        }
    }

    /// Takes a new focus set of node ids; unknown ids are dropped.
    pub fn update_focus(&mut self, ids: &[String], origin: FocusOrigin, now: f64) -> RenderPass {
        let focus = ids
            .iter()
            .filter_map(|id| {
                let index = self.tree.lookup(id);
                if index.is_none() {
                    warn!(id = id.as_str(), "focus id not in tree");
                }
                index
            })
            .collect::<Vec<_>>();

        update_focus_counts(&mut self.tree, &focus);
        self.state.row_focus = focus;

        if origin == FocusOrigin::Navigation || self.state.row_focus.is_empty() {
            return RenderPass::Light;
        }
        let target = focus_target(&self.tree, &self.state.row_focus);
        self.request_index(target, NavSource::Focus, now)
            .max(RenderPass::Light)
    }

    pub fn drain_events(&mut self) -> Vec<NavEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn tree(&self) -> &TaxonTree {
        &self.tree
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn scale_config(&self) -> &ScaleConfig {
        &self.scale_config
    }

    pub fn window(&self) -> &VisibilityWindow {
        &self.window
    }

    pub fn reached_depth(&self) -> usize {
        self.reached_depth
    }

    pub fn old_window(&self) -> Option<&VisibilityWindow> {
        match &self.phase {
            Phase::Zooming(task) => Some(&task.old_window),
            Phase::Idle => None,
        }
    }

    pub fn is_zooming(&self) -> bool {
        matches!(self.phase, Phase::Zooming(_))
    }

    pub fn zoom_target(&self) -> Option<usize> {
        match &self.phase {
            Phase::Zooming(task) => Some(task.target),
            Phase::Idle => None,
        }
    }

    pub fn layout_root(&self) -> usize {
        self.state.layout_root.unwrap_or(0)
    }

    pub fn render_context<'a>(&'a self, style: &'a SceneStyle) -> RenderContext<'a> {
        RenderContext {
            geometry: GeometryContext {
                tree: &self.tree,
                scale: &self.scale,
                window: &self.window,
                old_window: self.old_window(),
                layout_root: self.layout_root(),
                outer_depth: self.scale_config.outer_depth,
                common_names: style.common_names,
            },
            colours: &style.colours,
            strategy: style.strategy,
            selected: self.state.selected,
            hovered: self.state.hovered,
        }
    }

    pub fn render(&self, pass: RenderPass, scene: &mut Scene, style: &SceneStyle) {
        match pass {
            RenderPass::None => {}
            RenderPass::Light => {
                render_light(&self.render_context(style), scene);
            }
            RenderPass::Full => *scene = render_full(&self.render_context(style)),
        }
    }

    fn begin_zoom(&mut self, target: usize, now: f64) -> RenderPass {
        let bounds = bound_nodes(&self.tree, target, &self.scale_config);

        let old_window = match std::mem::take(&mut self.phase) {
            Phase::Zooming(cancelled) => {
                debug!(
                    cancelled = %self.tree.node(cancelled.target).id,
                    "zoom replaced before completion"
                );
                cancelled.old_window.union(&self.window)
            }
            Phase::Idle => self.window.clone(),
        };

        if self.zoom_duration <= 0.0 {
            self.commit(target);
            return RenderPass::Full;
        }

        let from = ScaleState {
            zoom_progress: 0.0,
            ..self.scale.clone()
        };
        let to = ScaleState {
            zoom_progress: 1.0,
            ..bounds.scale
        };
        info!(
            target = %self.tree.node(target).id,
            reached_depth = bounds.reached_depth,
            "zoom started"
        );

        self.scale = from.clone();
        self.window = bounds.window;
        self.reached_depth = bounds.reached_depth;
        self.phase = Phase::Zooming(ZoomTask {
            target,
            from,
            to,
            old_window,
            started_at: now,
        });
        RenderPass::Full
    }

    fn commit(&mut self, target: usize) {
        let bounds = bound_nodes(&self.tree, target, &self.scale_config);
        self.window = bounds.window;
        self.scale = bounds.scale;
        self.reached_depth = bounds.reached_depth;
        self.phase = Phase::Idle;
        self.state.layout_root = Some(target);

        let id = self.tree.node(target).id.clone();
        info!(layout = %id, visible = self.window.visible_count(), "layout committed");
        self.events.push(NavEvent::LayoutChanged(id));
    }
}
