//! Roam Simulation Engine Library
//!
//! A population of named entities moving inside a geographic bounding box,
//! advanced one tick at a time, with name search and follow selection.

pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod geo;
pub mod output;
pub mod query;
pub mod scheduler;
pub mod setup;
pub mod store;
pub mod systems;

pub use components::{Entity, EntityId, PathLeg};
pub use config::{Config, JitterMode};
pub use engine::Engine;
pub use error::{ConfigError, EngineError, ProviderError};
pub use query::{FollowChange, SearchOutcome};
pub use scheduler::TickScheduler;
pub use store::{PopulationStore, TickReport};

pub use roam_events::{Bounds, EntitySnapshot, GeoPoint, MotionPolicyKind, PopulationSnapshot};
