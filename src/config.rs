use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::colour::Rgb;
use crate::sunburst::{ColourStrategy, Easing};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScaleConfig {
    /// Thickness of the thin rings drawn for ancestors of the layout root.
    pub inner_depth: f64,
    /// Thickness of the outermost, label-carrying ring.
    pub outer_depth: f64,
    /// Absolute ring thicknesses used while the global root is the layout root.
    pub root_radii: Vec<f64>,
    pub max_nodes: usize,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            inner_depth: 1.0 / 22.0,
            outer_depth: 13.0 / 22.0,
            root_radii: vec![3.0 / 22.0, 3.0 / 22.0, 3.0 / 22.0, 13.0 / 22.0],
            max_nodes: 200,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ColourConfig {
    pub low: Rgb,
    pub high: Rgb,
    pub unfocused: Rgb,
}

impl Default for ColourConfig {
    fn default() -> Self {
        Self {
            low: Rgb::new(0x9e, 0xca, 0xe1),
            high: Rgb::new(0xe7, 0x96, 0x9c),
            unfocused: Rgb::new(0xdd, 0xdd, 0xdd),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub scale: ScaleConfig,
    pub colours: ColourConfig,
    pub zoom_duration_ms: u64,
    pub easing: Easing,
    pub max_suggestions: usize,
    pub history_limit: usize,
    pub colour_count: ColourStrategy,
    pub common_names: bool,
    pub query_on_startup: Option<String>,
    pub resource_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scale: ScaleConfig::default(),
            colours: ColourConfig::default(),
            zoom_duration_ms: 1250,
            easing: Easing::Swing,
            max_suggestions: 12,
            history_limit: 64,
            colour_count: ColourStrategy::Undocumented,
            common_names: true,
            query_on_startup: None,
            resource_base: "assets".to_owned(),
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))
    }

    pub fn zoom_duration_secs(&self) -> f64 {
        self.zoom_duration_ms as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r##"
            zoom-duration-ms = 0
            colour-count = "observation"

            [scale]
            max-nodes = 50

            [colours]
            unfocused = "#eeeeee"
            "##,
        )
        .unwrap();

        assert_eq!(config.zoom_duration_ms, 0);
        assert_eq!(config.colour_count, ColourStrategy::Observation);
        assert_eq!(config.scale.max_nodes, 50);
        assert_eq!(config.scale.root_radii.len(), 4);
        assert_eq!(config.colours.unfocused, Rgb::new(0xee, 0xee, 0xee));
        assert_eq!(config.colours.low, ColourConfig::default().low);
    }

    #[test]
    fn bad_colour_is_a_config_error() {
        let parsed = toml::from_str::<Config>("[colours]\nlow = \"blue\"\n");
        assert!(parsed.is_err());
    }
}
