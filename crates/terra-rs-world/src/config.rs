//! Terrain generation settings.

use serde::Deserialize;

use crate::error::ConfigError;

/// Tunables for height-map generation, matrix building, and flora scattering.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// World width in columns.
    pub columns: u32,
    /// Upper clamp for every elevation value.
    pub max_mountain_height: u32,
    /// Rows filled below each column's elevation.
    pub base_depth: u32,
    /// Number of 3-point moving-average passes.
    pub smoothing_passes: u32,
    /// Elevation around which the sinusoids oscillate.
    pub base_height: f64,
    pub mountain_frequency: f64,
    pub mountain_amplitude: f64,
    pub hill_frequency: f64,
    pub hill_amplitude: f64,
    /// Per-column chance of a peak.
    pub peak_chance: f64,
    pub peak_amplitude: f64,
    /// Uniform noise in `[-roughness, roughness]`.
    pub roughness: f64,
    /// Surface-down rows that are always dirt below the grass row.
    pub dirt_rows: u32,
    pub stone_factor: f64,
    pub stone_clamp: f64,
    pub tree_chance: f64,
    pub bush_chance: f64,
    /// Edge length of a block in world units.
    pub block_size: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            columns: 256,
            max_mountain_height: 40,
            base_depth: 30,
            smoothing_passes: 3,
            base_height: 12.0,
            mountain_frequency: 0.02,
            mountain_amplitude: 10.0,
            hill_frequency: 0.09,
            hill_amplitude: 3.0,
            peak_chance: 0.02,
            peak_amplitude: 12.0,
            roughness: 1.0,
            dirt_rows: 3,
            stone_factor: 1.5,
            stone_clamp: 0.7,
            tree_chance: 0.08,
            bush_chance: 0.12,
            block_size: 32.0,
        }
    }
}

impl TerrainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 {
            return Err(ConfigError::invalid("columns", "must be at least 1"));
        }
        if self.base_depth == 0 {
            return Err(ConfigError::invalid("base_depth", "must be at least 1"));
        }
        if !(self.block_size.is_finite() && self.block_size > 0.0) {
            return Err(ConfigError::invalid(
                "block_size",
                format!("must be a positive number, got {}", self.block_size),
            ));
        }
        for (field, p) in [
            ("peak_chance", self.peak_chance),
            ("stone_clamp", self.stone_clamp),
            ("tree_chance", self.tree_chance),
            ("bush_chance", self.bush_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::invalid(field, format!("{p} is not a probability")));
            }
        }
        if self.tree_chance + self.bush_chance > 1.0 {
            return Err(ConfigError::invalid(
                "bush_chance",
                "tree_chance + bush_chance must not exceed 1",
            ));
        }
        for (field, v) in [
            ("roughness", self.roughness),
            ("stone_factor", self.stone_factor),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be a finite non-negative number, got {v}"),
                ));
            }
        }
        // Matrix rows = tallest column + base depth.
        if self.max_mountain_height.checked_add(self.base_depth).is_none() {
            return Err(ConfigError::invalid(
                "max_mountain_height",
                "max_mountain_height + base_depth overflows the row count",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(TerrainConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_columns() {
        let cfg = TerrainConfig {
            columns: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "columns", .. })
        ));
    }

    #[test]
    fn rejects_bad_probability() {
        let cfg = TerrainConfig {
            tree_chance: 1.5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_roughness() {
        for roughness in [f64::INFINITY, f64::NAN, -1.0] {
            let cfg = TerrainConfig {
                roughness,
                ..Default::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::Invalid { field: "roughness", .. })
            ));
        }
    }

    #[test]
    fn rejects_infinite_roughness_from_toml() {
        let cfg: TerrainConfig = toml::from_str("roughness = inf").unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_row_count_overflow() {
        let cfg = TerrainConfig {
            max_mountain_height: u32::MAX,
            base_depth: 1,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "max_mountain_height", .. })
        ));
    }

    #[test]
    fn rejects_non_positive_block_size() {
        let cfg = TerrainConfig {
            block_size: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
