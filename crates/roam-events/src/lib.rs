//! Shared snapshot types for the roam simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! Renderers and other consumers depend on it to read what the engine
//! publishes after each committed tick.

pub mod geo;
pub mod snapshot;

// Re-export geographic types
pub use geo::{Bounds, GeoPoint};

// Re-export snapshot types
pub use snapshot::{
    generate_snapshot_id, EntitySnapshot, LegSnapshot, MotionPolicyKind, PopulationSnapshot,
};
