use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

pub type EasingFn = fn(f64) -> f64;

pub fn linear(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

pub fn swing(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    0.5 - (PI * t).cos() / 2.0
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Swing,
    Linear,
}

impl Easing {
    pub fn function(self) -> EasingFn {
        match self {
            Self::Swing => swing,
            Self::Linear => linear,
        }
    }

    pub fn apply(self, t: f64) -> f64 {
        (self.function())(t)
    }
}
