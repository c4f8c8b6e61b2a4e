//! Components
//!
//! Per-entity state owned by the population store.

pub mod entity;

pub use entity::*;
