//! Configuration System
//!
//! Loads simulation parameters from roam.toml. Configuration is fixed at
//! startup; nothing here is reloaded while the engine runs.

use roam_events::{Bounds, MotionPolicyKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::geo;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "roam.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub bounds: Bounds,
    #[serde(default)]
    pub speed: SpeedConfig,
    #[serde(default)]
    pub motion: MotionConfig,
}

/// Simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of entities generated at startup
    pub population: usize,
    /// Simulated seconds per tick; also the scheduler period
    pub tick_seconds: f64,
    /// Seed for the store's random number generator
    pub seed: u64,
    /// Ticks between snapshot exports
    pub snapshot_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            population: 100,
            tick_seconds: 1.0,
            seed: 42,
            snapshot_interval: 60,
        }
    }
}

/// Speed range in km/h
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    pub min_kmh: f64,
    pub max_kmh: f64,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            min_kmh: 0.0,
            max_kmh: 80.0,
        }
    }
}

impl SpeedConfig {
    /// Holds a speed inside the configured range.
    pub fn clamp(&self, speed_kmh: f64) -> f64 {
        speed_kmh.clamp(self.min_kmh, self.max_kmh)
    }

    pub fn contains(&self, speed_kmh: f64) -> bool {
        (self.min_kmh..=self.max_kmh).contains(&speed_kmh)
    }
}

/// How often the midpoint jitter of a path leg is rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JitterMode {
    /// Re-rolled every tick, so an entity wobbles slightly along a fixed leg
    #[default]
    PerTick,
    /// Rolled once when the leg is planned
    PerLeg,
}

/// Motion model selection and tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub policy: MotionPolicyKind,
    /// Full width of the midpoint jitter window, in degrees
    pub jitter_degrees: f64,
    pub jitter: JitterMode,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            policy: MotionPolicyKind::PathFollowing,
            jitter_degrees: 0.00001,
            jitter: JitterMode::PerTick,
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_str(content: &str) -> ConfigResult<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default path, or use defaults if not found
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_PATH).unwrap_or_else(|e| {
            tracing::warn!("Could not load {}: {}. Using defaults.", DEFAULT_CONFIG_PATH, e);
            Self::default()
        })
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Fail fast on values the engine cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        geo::validate_bounds(&self.bounds)?;

        let speed = &self.speed;
        if !speed.min_kmh.is_finite()
            || !speed.max_kmh.is_finite()
            || speed.min_kmh < 0.0
            || speed.min_kmh > speed.max_kmh
        {
            return Err(ConfigError::InvalidSpeedRange {
                min: speed.min_kmh,
                max: speed.max_kmh,
            });
        }

        let tick = self.simulation.tick_seconds;
        if !tick.is_finite() || tick <= 0.0 {
            return Err(ConfigError::InvalidTickPeriod(tick));
        }

        if self.simulation.population == 0 {
            return Err(ConfigError::EmptyPopulation);
        }

        if self.simulation.snapshot_interval == 0 {
            return Err(ConfigError::InvalidSnapshotInterval);
        }

        let jitter = self.motion.jitter_degrees;
        if !jitter.is_finite() || jitter < 0.0 {
            return Err(ConfigError::InvalidJitter(jitter));
        }

        Ok(())
    }
}
