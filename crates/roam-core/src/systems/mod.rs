//! Simulation Systems
//!
//! Path planning and the motion models that advance entities each tick.

pub mod motion;
pub mod planner;

pub use motion::{
    motion_model_for, MotionModel, MotionParams, PathFollowing, RandomWalk, StepOutcome,
};
pub use planner::{build_waypoints, interpolate, jittered_midpoint, plan_leg, Waypoints};
