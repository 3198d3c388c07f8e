use tracing::debug;

use crate::config::ScaleConfig;

use super::scale::RADIAL_EXTENT;

fn push_rings(radii: &mut Vec<f64>, count: usize, thickness: f64) {
    let mut last = radii.last().copied().unwrap_or(0.0);
    for _ in 0..count {
        last += thickness;
        radii.push(last);
    }
}

/// Cumulative ring radii, one entry per depth plus a closing sentinel.
pub fn radius_scale(
    inner_rings: usize,
    visible_rings: usize,
    total_rings: usize,
    config: &ScaleConfig,
    at_root: bool,
) -> Vec<f64> {
    let mut radii = vec![0.0];
    let visible_rings = visible_rings.clamp(1, total_rings.max(1));

    if at_root && !config.root_radii.is_empty() {
        for &thickness in &config.root_radii {
            push_rings(&mut radii, 1, RADIAL_EXTENT * thickness);
        }
        let padding = (total_rings + 1).saturating_sub(radii.len());
        push_rings(&mut radii, padding, 0.0);
    } else {
        let inner_rings = inner_rings.min(visible_rings - 1);
        let available = visible_rings - inner_rings;

        // Ancestor rings never take more than half the extent.
        let inner_depth = if inner_rings > 0 {
            config.inner_depth.min(0.5 / inner_rings as f64)
        } else {
            config.inner_depth
        };

        let step = config.outer_depth - config.inner_depth;
        let outer_estimate = if step > 0.0 {
            ((1.0 - visible_rings as f64 * config.inner_depth) / step).floor()
        } else {
            0.0
        };
        let outer_rings = (outer_estimate.max(0.0) as usize).min(available);
        let middle_rings = available - outer_rings;

        let mut outer_depth = config.outer_depth;
        let committed = outer_rings as f64 * outer_depth + inner_rings as f64 * inner_depth;
        if committed > 1.0 && outer_rings > 0 {
            outer_depth = ((1.0 - inner_rings as f64 * inner_depth) / outer_rings as f64).max(0.0);
        }
        let middle_depth = if middle_rings > 0 {
            ((1.0 - outer_rings as f64 * outer_depth - inner_rings as f64 * inner_depth)
                / middle_rings as f64)
                .max(0.0)
        } else {
            0.0
        };

        debug!(
            inner_rings,
            middle_rings, outer_rings, visible_rings, "allocated ring thicknesses"
        );

        push_rings(&mut radii, inner_rings, RADIAL_EXTENT * inner_depth);
        push_rings(&mut radii, middle_rings, RADIAL_EXTENT * middle_depth);
        push_rings(&mut radii, outer_rings, RADIAL_EXTENT * outer_depth);
        push_rings(&mut radii, total_rings.saturating_sub(visible_rings), 0.0);
    }

    radii
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn root_regime_uses_configured_thicknesses() {
        let config = ScaleConfig::default();
        let radii = radius_scale(0, 4, 7, &config, true);

        assert_eq!(radii.len(), 8);
        for (ring, &thickness) in config.root_radii.iter().enumerate() {
            assert!(approx(radii[ring + 1] - radii[ring], thickness * RADIAL_EXTENT));
        }
        assert!(approx(radii[4], RADIAL_EXTENT));
        assert!(radii[4..].iter().all(|&r| approx(r, RADIAL_EXTENT)));
    }

    #[test]
    fn zoomed_regime_gives_the_outer_ring_the_most_room() {
        let config = ScaleConfig::default();
        // Layout root at depth 2, drawn down to depth 4, tree depth 6.
        let radii = radius_scale(2, 5, 7, &config, false);

        assert_eq!(radii.len(), 8);
        let thickness = |ring: usize| radii[ring + 1] - radii[ring];
        assert!(approx(thickness(0), 1000.0 / 22.0));
        assert!(approx(thickness(1), 1000.0 / 22.0));
        assert!(approx(thickness(4), 13_000.0 / 22.0));
        assert!(thickness(4) > thickness(2));
        assert!(approx(thickness(2), thickness(3)));
        assert!(approx(radii[5], RADIAL_EXTENT));
        assert_eq!(thickness(5), 0.0);
    }

    #[test]
    fn pathological_depth_is_clamped_instead_of_going_negative() {
        let config = ScaleConfig::default();
        let radii = radius_scale(40, 45, 60, &config, false);

        assert_eq!(radii.len(), 61);
        assert!(radii.windows(2).all(|pair| pair[1] >= pair[0]));
        assert!(radii.last().copied().unwrap() <= RADIAL_EXTENT + 1e-6);
    }

    proptest! {
        #[test]
        fn radii_never_decrease(
            inner in 0usize..30,
            extra in 1usize..30,
            spare in 0usize..10,
            at_root in any::<bool>(),
        ) {
            let visible = inner + extra;
            let total = visible + spare;
            let radii = radius_scale(inner, visible, total, &ScaleConfig::default(), at_root);

            prop_assert!(radii.len() > total);
            prop_assert!(radii.windows(2).all(|pair| pair[1] >= pair[0]));
            prop_assert!(*radii.last().unwrap() <= RADIAL_EXTENT + 1e-6);
        }
    }
}
