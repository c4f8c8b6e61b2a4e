//! Error Types
//!
//! Configuration and engine errors.

use thiserror::Error;

use crate::components::EntityId;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid bounds: {reason}")]
    InvalidBounds { reason: String },

    #[error("invalid speed range: min {min} km/h, max {max} km/h")]
    InvalidSpeedRange { min: f64, max: f64 },

    #[error("tick period must be positive and finite, got {0} s")]
    InvalidTickPeriod(f64),

    #[error("population size must be at least 1")]
    EmptyPopulation,

    #[error("waypoint jitter must be non-negative and finite, got {0} degrees")]
    InvalidJitter(f64),

    #[error("snapshot interval must be at least 1 tick")]
    InvalidSnapshotInterval,
}

/// Errors surfaced by the engine's command surface.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot generate an empty population")]
    InvalidCount,

    #[error("identifier provider failed: {0}")]
    IdProvider(#[source] ProviderError),

    #[error("name provider failed: {0}")]
    NameProvider(#[source] ProviderError),

    #[error("identifier provider returned duplicate id {0}")]
    DuplicateId(EntityId),

    #[error("no entity with id {0}")]
    UnknownEntity(EntityId),
}

/// Failure reported by an injected name or identifier provider.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
pub type EngineResult<T> = Result<T, EngineError>;
