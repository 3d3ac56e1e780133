use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use terra_rs_game::config::GameConfig;
use terra_rs_world::config::TerrainConfig;
use terra_rs_world::error::ConfigError;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Deserialize)]
pub struct SandboxConfig {
    pub world: WorldSection,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize)]
pub struct WorldSection {
    pub seed: u64,
    #[serde(default)]
    pub terrain: TerrainConfig,
}

#[derive(Debug, Deserialize)]
pub struct SessionSection {
    /// Frames to simulate.
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Fixed frame delta in seconds.
    #[serde(default = "default_dt")]
    pub dt: f32,
    /// Frames spent on each mining or placement step of the script.
    #[serde(default = "default_step_ticks")]
    pub step_ticks: u64,
}

fn default_ticks() -> u64 {
    1800
}

fn default_dt() -> f32 {
    1.0 / 60.0
}

fn default_step_ticks() -> u64 {
    90
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            dt: default_dt(),
            step_ticks: default_step_ticks(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl SandboxConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, LoadError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.world.terrain.validate()?;
        self.game.validate()?;
        if !(self.session.dt.is_finite() && self.session.dt > 0.0) {
            return Err(ConfigError::invalid("session.dt", "must be positive"));
        }
        if self.session.step_ticks == 0 {
            return Err(ConfigError::invalid("session.step_ticks", "must be at least 1"));
        }
        Ok(())
    }
}
