use serde::{Deserialize, Serialize};

use crate::colour::Rgb;
use crate::config::ColourConfig;
use crate::taxa::{TaxonNode, TaxonTree};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColourStrategy {
    #[default]
    Undocumented,
    Observation,
}

impl ColourStrategy {
    pub fn label(self) -> &'static str {
        match self {
            Self::Undocumented => "Documentation",
            Self::Observation => "Observations",
        }
    }

    pub fn fill(self, tree: &TaxonTree, node: &TaxonNode, colours: &ColourConfig) -> Rgb {
        let low = node.low_colour.unwrap_or(colours.low);
        let high = node.high_colour.unwrap_or(colours.high);
        let child_count = node.child_count.max(1) as f64;

        match self {
            Self::Undocumented => {
                let documented = 1.0 - node.undocumented_count as f64 / child_count;
                high.interpolate(low, documented)
            }
            Self::Observation => {
                let root_observations = tree.root().observation_count;
                let fraction = if root_observations == 0 {
                    0.0
                } else {
                    (node.observation_count as f64 / root_observations as f64).powf(0.2)
                };
                let base = low.interpolate(high, fraction);
                let focus = node.focus_count as f64 / child_count;
                colours.unfocused.interpolate(base, focus)
            }
        }
    }
}
