//! One-dimensional elevation profile generation.
//!
//! Elevation is the sum of a low-frequency mountain sinusoid, a medium-frequency
//! hill sinusoid, rare large peaks, and small uniform roughness. Values are
//! clamped to `[0, max_mountain_height]` and then smoothed with 3-point moving
//! averages that leave the two edge columns untouched.

use std::f64::consts::TAU;

use rand::Rng;
use tracing::debug;

use crate::config::TerrainConfig;

/// Per-column terrain heights. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElevationProfile {
    heights: Vec<u32>,
}

impl ElevationProfile {
    /// Wrap an explicit profile. Used by tests and hand-authored maps.
    pub fn from_heights(heights: Vec<u32>) -> Self {
        Self { heights }
    }

    pub fn heights(&self) -> &[u32] {
        &self.heights
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn get(&self, column: usize) -> Option<u32> {
        self.heights.get(column).copied()
    }

    /// Tallest column. Zero for an empty profile.
    pub fn max_height(&self) -> u32 {
        self.heights.iter().copied().max().unwrap_or(0)
    }
}

/// Produces elevation profiles from a `TerrainConfig`.
pub struct HeightMapGenerator<'a> {
    config: &'a TerrainConfig,
}

impl<'a> HeightMapGenerator<'a> {
    pub fn new(config: &'a TerrainConfig) -> Self {
        Self { config }
    }

    /// Generate one elevation value per column.
    pub fn generate<R: Rng + ?Sized>(&self, columns: usize, rng: &mut R) -> ElevationProfile {
        let cfg = self.config;
        let max = cfg.max_mountain_height as f64;
        let mountain_phase = rng.gen_range(0.0..TAU);
        let hill_phase = rng.gen_range(0.0..TAU);
        let peak_chance = cfg.peak_chance.clamp(0.0, 1.0);

        let mut raw: Vec<u32> = (0..columns)
            .map(|column| {
                let x = column as f64;
                let mountain =
                    (x * cfg.mountain_frequency + mountain_phase).sin() * cfg.mountain_amplitude;
                let hill = (x * cfg.hill_frequency + hill_phase).sin() * cfg.hill_amplitude;
                let mut height = cfg.base_height + mountain + hill;

                if rng.gen_bool(peak_chance) {
                    height += rng.gen_range(0.5..=1.0) * cfg.peak_amplitude;
                }
                if cfg.roughness > 0.0 {
                    height += rng.gen_range(-cfg.roughness..=cfg.roughness);
                }

                height.round().clamp(0.0, max) as u32
            })
            .collect();

        for _ in 0..cfg.smoothing_passes {
            smooth(&mut raw);
        }

        let profile = ElevationProfile { heights: raw };
        debug!(
            columns,
            max_height = profile.max_height(),
            "generated elevation profile"
        );
        profile
    }
}

/// One 3-point moving-average pass. Edge columns are left as they are.
fn smooth(heights: &mut [u32]) {
    if heights.len() < 3 {
        return;
    }
    let previous = heights.to_vec();
    for i in 1..heights.len() - 1 {
        let sum = previous[i - 1] as u64 + previous[i] as u64 + previous[i + 1] as u64;
        heights[i] = (sum as f64 / 3.0).round() as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn profile_has_requested_width() {
        let cfg = TerrainConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let profile = HeightMapGenerator::new(&cfg).generate(200, &mut rng);
        assert_eq!(profile.len(), 200);
    }

    #[test]
    fn same_seed_same_profile() {
        let cfg = TerrainConfig::default();
        let gen = HeightMapGenerator::new(&cfg);
        let a = gen.generate(128, &mut StdRng::seed_from_u64(42));
        let b = gen.generate(128, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let cfg = TerrainConfig::default();
        let gen = HeightMapGenerator::new(&cfg);
        let a = gen.generate(128, &mut StdRng::seed_from_u64(1));
        let b = gen.generate(128, &mut StdRng::seed_from_u64(2));
        assert_ne!(a, b);
    }

    #[test]
    fn smoothing_removes_single_column_spike() {
        let mut h = vec![5, 5, 5, 30, 5, 5, 5];
        smooth(&mut h);
        assert!(h[3] < 30);
        assert_eq!(h[0], 5);
        assert_eq!(h[6], 5);
    }

    #[test]
    fn smoothing_leaves_edges_alone() {
        let mut h = vec![0, 9, 9, 9, 0];
        smooth(&mut h);
        assert_eq!(h[0], 0);
        assert_eq!(h[4], 0);
        assert_eq!(h[1], 6);
    }

    #[test]
    fn smoothing_tall_columns_does_not_overflow() {
        let mut h = vec![u32::MAX; 4];
        smooth(&mut h);
        assert_eq!(h, vec![u32::MAX; 4]);
    }

    #[test]
    fn tiny_profiles_skip_smoothing() {
        let mut h = vec![3, 7];
        smooth(&mut h);
        assert_eq!(h, vec![3, 7]);
    }

    #[test]
    fn extreme_amplitudes_are_clamped() {
        let cfg = TerrainConfig {
            base_height: 1000.0,
            peak_chance: 1.0,
            ..Default::default()
        };
        let profile = HeightMapGenerator::new(&cfg).generate(64, &mut StdRng::seed_from_u64(3));
        assert!(profile.heights().iter().all(|&h| h == cfg.max_mountain_height));
    }

    #[test]
    fn max_height_of_empty_profile_is_zero() {
        assert_eq!(ElevationProfile::from_heights(Vec::new()).max_height(), 0);
    }

    proptest! {
        #[test]
        fn heights_stay_in_bounds(
            seed in any::<u64>(),
            width in 0usize..400,
            max in 0u32..80,
            base in -50.0f64..150.0,
        ) {
            let cfg = TerrainConfig {
                max_mountain_height: max,
                base_height: base,
                ..Default::default()
            };
            let profile = HeightMapGenerator::new(&cfg)
                .generate(width, &mut StdRng::seed_from_u64(seed));
            prop_assert_eq!(profile.len(), width);
            prop_assert!(profile.heights().iter().all(|&h| h <= max));
        }
    }
}
