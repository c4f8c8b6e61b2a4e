//! Population Setup
//!
//! Entity spawning and the default name and identifier providers.

pub mod population;

pub use population::*;
