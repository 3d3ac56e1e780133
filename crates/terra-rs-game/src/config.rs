//! Gameplay tunables.

use serde::Deserialize;

use terra_rs_world::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub mining: MiningConfig,
    pub drops: DropConfig,
    pub player: PlayerConfig,
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mining.validate()?;
        self.drops.validate()?;
        self.player.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Seconds of continuous mining between two hits.
    pub interval: f32,
    /// Life removed per hit.
    pub damage: u32,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            interval: 0.25,
            damage: 1,
        }
    }
}

impl MiningConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.interval.is_finite() && self.interval > 0.0) {
            return Err(ConfigError::invalid("mining.interval", "must be positive"));
        }
        if self.damage == 0 {
            return Err(ConfigError::invalid("mining.damage", "must be at least 1"));
        }
        Ok(())
    }
}

/// Distances are world units, speeds are world units per second, times are
/// seconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    pub merge_radius: f32,
    pub attraction_radius: f32,
    pub attraction_speed: f32,
    pub pickup_radius: f32,
    /// Distance at which a pulled drop enters the inventory.
    pub pickup_distance: f32,
    pub pull_speed: f32,
    /// Age before a drop can be picked up.
    pub pickup_cooldown: f64,
    /// Age before a drop can absorb other drops.
    pub merge_cooldown: f64,
    /// Fraction of velocity lost per second when not steered.
    pub damping: f32,
    pub despawn_after: f64,
    /// Integrate drop velocity here. Disable when the host syncs physics bodies.
    pub integrate_motion: bool,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            merge_radius: 12.0,
            attraction_radius: 96.0,
            attraction_speed: 60.0,
            pickup_radius: 80.0,
            pickup_distance: 16.0,
            pull_speed: 240.0,
            pickup_cooldown: 0.5,
            merge_cooldown: 0.5,
            damping: 4.0,
            despawn_after: 300.0,
            integrate_motion: true,
        }
    }
}

impl DropConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, v) in [
            ("drops.merge_radius", self.merge_radius),
            ("drops.attraction_radius", self.attraction_radius),
            ("drops.attraction_speed", self.attraction_speed),
            ("drops.pickup_radius", self.pickup_radius),
            ("drops.pickup_distance", self.pickup_distance),
            ("drops.pull_speed", self.pull_speed),
            ("drops.damping", self.damping),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(ConfigError::invalid(field, format!("{v} must be non-negative")));
            }
        }
        if self.pickup_distance > self.pickup_radius {
            return Err(ConfigError::invalid(
                "drops.pickup_distance",
                "must not exceed pickup_radius",
            ));
        }
        if self.pickup_cooldown < 0.0 {
            return Err(ConfigError::invalid("drops.pickup_cooldown", "must be non-negative"));
        }
        if self.merge_cooldown < 0.0 {
            return Err(ConfigError::invalid("drops.merge_cooldown", "must be non-negative"));
        }
        if self.despawn_after <= 0.0 {
            return Err(ConfigError::invalid("drops.despawn_after", "must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Farthest pointer distance at which the player can mine or place.
    pub reach: f32,
    pub hotbar_slots: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            reach: 160.0,
            hotbar_slots: 9,
        }
    }
}

impl PlayerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.reach.is_finite() && self.reach > 0.0) {
            return Err(ConfigError::invalid("player.reach", "must be positive"));
        }
        if self.hotbar_slots == 0 {
            return Err(ConfigError::invalid("player.hotbar_slots", "must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn pickup_distance_must_fit_in_radius() {
        let mut cfg = GameConfig::default();
        cfg.drops.pickup_distance = cfg.drops.pickup_radius + 1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_interval_rejected() {
        let mut cfg = GameConfig::default();
        cfg.mining.interval = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "mining.interval", .. })
        ));
    }

    #[test]
    fn nan_reach_rejected() {
        let mut cfg = GameConfig::default();
        cfg.player.reach = f32::NAN;
        assert!(cfg.validate().is_err());
    }
}
