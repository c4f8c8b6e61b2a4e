//! Output Module
//!
//! JSON exports of population snapshots and run statistics.

pub mod snapshot;
pub mod stats;

pub use snapshot::*;
pub use stats::*;
