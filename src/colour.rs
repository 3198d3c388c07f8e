use std::fmt;

use serde::{Deserialize, Serialize};

use crate::taxa::TaxaError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(value: &str) -> Result<Self, TaxaError> {
        let invalid = || TaxaError::InvalidColour(value.to_owned());
        let digits = value.trim().trim_start_matches('#');

        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => digits.to_owned(),
            _ => return Err(invalid()),
        };

        let channel = |range: std::ops::Range<usize>| {
            expanded
                .get(range)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(invalid)
        };

        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn interpolate(self, other: Rgb, f: f64) -> Rgb {
        let f = if f.is_finite() { f.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| ((1.0 - f) * a as f64 + f * b as f64).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    pub fn to_hsl(self) -> [f64; 3] {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if (max - min).abs() < f64::EPSILON {
            return [0.0, 0.0, l];
        }

        let d = max - min;
        let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        [h / 6.0, s, l]
    }

    pub fn from_hsl([h, s, l]: [f64; 3]) -> Rgb {
        let to_byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        if s <= 0.0 {
            let grey = to_byte(l);
            return Rgb::new(grey, grey, grey);
        }

        fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            }
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Rgb::new(
            to_byte(hue_to_rgb(p, q, h + 1.0 / 3.0)),
            to_byte(hue_to_rgb(p, q, h)),
            to_byte(hue_to_rgb(p, q, h - 1.0 / 3.0)),
        )
    }

    pub fn light_dark_pair(self) -> (Rgb, Rgb) {
        let [h, s, l] = self.to_hsl();
        let low = Rgb::from_hsl([h, s, l * 0.2 + 0.8]);
        let high = Rgb::from_hsl([h, s, l * 0.8 + 0.2]);
        (low, high)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = TaxaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}
