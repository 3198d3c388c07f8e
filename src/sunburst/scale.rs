use std::f64::consts::TAU;

/// Total radial extent shared out between the rings.
pub const RADIAL_EXTENT: f64 = 1000.0;

/// The animatable view state: angular window in leaf units, cumulative
/// ring radii indexed by depth, and progress of the running zoom.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScaleState {
    pub left: f64,
    pub right: f64,
    pub radius_scale: Vec<f64>,
    pub zoom_progress: f64,
}

impl ScaleState {
    pub fn angle(&self, index: f64) -> f64 {
        let span = self.right - self.left;
        if span.abs() < f64::EPSILON {
            return 0.0;
        }
        (TAU * (index - self.left) / span).clamp(0.0, TAU)
    }

    pub fn radius(&self, depth: usize) -> f64 {
        self.radius_scale
            .get(depth)
            .or_else(|| self.radius_scale.last())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn interpolate(&self, target: &ScaleState, f: f64) -> ScaleState {
        let lerp = |a: f64, b: f64| (1.0 - f) * a + f * b;
        let rings = self.radius_scale.len().max(target.radius_scale.len());

        ScaleState {
            left: lerp(self.left, target.left),
            right: lerp(self.right, target.right),
            radius_scale: (0..rings)
                .map(|depth| lerp(self.radius(depth), target.radius(depth)))
                .collect(),
            zoom_progress: lerp(self.zoom_progress, target.zoom_progress),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    #[test]
    fn angle_maps_window_onto_full_turn_and_clamps() {
        let scale = ScaleState {
            left: 2.0,
            right: 6.0,
            ..ScaleState::default()
        };
        assert_eq!(scale.angle(2.0), 0.0);
        assert!((scale.angle(4.0) - PI).abs() < 1e-12);
        assert_eq!(scale.angle(6.0), TAU);
        assert_eq!(scale.angle(0.0), 0.0);
        assert_eq!(scale.angle(9.0), TAU);
    }

    #[test]
    fn degenerate_window_does_not_divide_by_zero() {
        assert_eq!(ScaleState::default().angle(3.0), 0.0);
    }

    #[test]
    fn interpolation_blends_every_numeric_field() {
        let from = ScaleState {
            left: 0.0,
            right: 10.0,
            radius_scale: vec![0.0, 100.0],
            zoom_progress: 0.0,
        };
        let to = ScaleState {
            left: 4.0,
            right: 6.0,
            radius_scale: vec![0.0, 50.0, 300.0],
            zoom_progress: 1.0,
        };

        let mid = from.interpolate(&to, 0.5);
        assert_eq!(mid.left, 2.0);
        assert_eq!(mid.right, 8.0);
        assert_eq!(mid.radius_scale, vec![0.0, 75.0, 200.0]);
        assert_eq!(mid.zoom_progress, 0.5);
        assert_eq!(from.interpolate(&to, 1.0), to);
    }
}
