use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::render_utils::SceneTransform;
use super::super::{FuzzyMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

impl ViewModel {
    pub(in crate::app) fn hovered_segment(
        &self,
        ui: &Ui,
        transform: SceneTransform,
        response: &egui::Response,
    ) -> Option<usize> {
        if !response.hovered() {
            return None;
        }
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        let (x, y) = transform.to_scene(pointer);
        self.scene.hit_test_point(x, y)
    }

    pub(in crate::app) fn fuzzy_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        let layout_root = self.navigator.layout_root();
        let common_names = self.style.common_names;
        if let Some(cached) = &self.fuzzy_match_cache
            && cached.query == query
            && cached.scene_revision == self.scene_revision
            && cached.layout_root == layout_root
            && cached.common_names == common_names
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .scene
            .labels
            .iter()
            .filter(|label| fuzzy_match_score(&matcher, &label.text, query).is_some())
            .map(|label| label.node)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.fuzzy_match_cache = Some(FuzzyMatchCache {
            query: query.to_owned(),
            scene_revision: self.scene_revision,
            layout_root,
            common_names,
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }
}
