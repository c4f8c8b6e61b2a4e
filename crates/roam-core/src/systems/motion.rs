//! Motion Models
//!
//! Per-tick kinematic update for a single entity. Two policies exist and a
//! store runs exactly one of them over its whole population:
//!
//! - [`PathFollowing`]: travel along a planned leg, re-drawing speed every
//!   tick and re-planning once the leg is complete.
//! - [`RandomWalk`]: step in a random heading by the current speed, then
//!   re-derive speed from the distance actually covered.

use rand::rngs::SmallRng;
use rand::Rng;
use roam_events::{Bounds, GeoPoint, MotionPolicyKind};
use std::f64::consts::TAU;

use crate::components::{Entity, PathLeg};
use crate::config::{Config, JitterMode, SpeedConfig};
use crate::geo::{self, KM_PER_DEGREE};
use crate::systems::planner::{self, Waypoints};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Parameters shared by both policies, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionParams {
    pub bounds: Bounds,
    pub speed: SpeedConfig,
    pub tick_seconds: f64,
    pub jitter_degrees: f64,
    pub jitter: JitterMode,
}

impl MotionParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            bounds: config.bounds,
            speed: config.speed,
            tick_seconds: config.simulation.tick_seconds,
            jitter_degrees: config.motion.jitter_degrees,
            jitter: config.motion.jitter,
        }
    }
}

/// What a single entity update did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Position advanced; `clamped` when the bounds cut the move short
    Moved { clamped: bool },
    /// A completed leg was replaced; the entity did not move
    Replanned,
    /// The leg had zero length and was marked complete
    DegenerateLeg,
}

/// A per-tick state transition applied to every entity in a store.
pub trait MotionModel: Send + Sync {
    fn kind(&self) -> MotionPolicyKind;

    /// Prepares a freshly generated entity for this policy.
    fn init(&self, entity: &mut Entity, rng: &mut SmallRng);

    /// Advances one entity by one tick.
    fn advance(&self, entity: &mut Entity, rng: &mut SmallRng) -> StepOutcome;
}

/// Builds the configured policy.
pub fn motion_model_for(config: &Config) -> Box<dyn MotionModel> {
    let params = MotionParams::from_config(config);
    match config.motion.policy {
        MotionPolicyKind::PathFollowing => Box::new(PathFollowing::new(params)),
        MotionPolicyKind::RandomWalk => Box::new(RandomWalk::new(params)),
    }
}

/// Point-to-point travel along two-waypoint legs.
#[derive(Debug, Clone)]
pub struct PathFollowing {
    params: MotionParams,
}

impl PathFollowing {
    pub fn new(params: MotionParams) -> Self {
        Self { params }
    }

    /// New leg from `start` to a random destination.
    pub fn new_leg(&self, start: GeoPoint, rng: &mut SmallRng) -> PathLeg {
        let end = planner::plan_leg(&self.params.bounds, rng);
        let midpoint =
            planner::jittered_midpoint(start, end, &self.params.bounds, self.params.jitter_degrees, rng);
        PathLeg::new(start, end, midpoint)
    }

    /// Whole-number km/h, uniform over the configured range.
    fn draw_speed(&self, rng: &mut SmallRng) -> f64 {
        let SpeedConfig { min_kmh, max_kmh } = self.params.speed;
        let drawn = (rng.gen::<f64>() * (max_kmh - min_kmh + 1.0) + min_kmh).floor();
        drawn.clamp(min_kmh, max_kmh)
    }
}

impl MotionModel for PathFollowing {
    fn kind(&self) -> MotionPolicyKind {
        MotionPolicyKind::PathFollowing
    }

    fn init(&self, entity: &mut Entity, rng: &mut SmallRng) {
        entity.leg = Some(self.new_leg(entity.position, rng));
    }

    fn advance(&self, entity: &mut Entity, rng: &mut SmallRng) -> StepOutcome {
        let mut leg = match entity.leg {
            Some(leg) if !leg.is_complete() => leg,
            _ => {
                entity.leg = Some(self.new_leg(entity.position, rng));
                return StepOutcome::Replanned;
            }
        };

        let speed = self.draw_speed(rng);
        let total_km = geo::distance_km(leg.start, leg.end);
        let degenerate = !(total_km.is_finite() && total_km > 0.0);

        let progress = if degenerate {
            1.0
        } else {
            let increment = (speed / SECONDS_PER_HOUR) * self.params.tick_seconds / total_km;
            (leg.progress + increment).min(1.0)
        };

        let waypoints = match self.params.jitter {
            JitterMode::PerTick => planner::build_waypoints(
                leg.start,
                leg.end,
                &self.params.bounds,
                self.params.jitter_degrees,
                rng,
            ),
            JitterMode::PerLeg => Waypoints([leg.start, leg.midpoint]),
        };

        let target = planner::interpolate(&waypoints, progress);
        let position = geo::clamp_to_bounds(target, &self.params.bounds);

        leg.progress = progress;
        entity.leg = Some(leg);
        entity.speed_kmh = speed;
        entity.position = position;

        if degenerate {
            StepOutcome::DegenerateLeg
        } else {
            StepOutcome::Moved { clamped: position != target }
        }
    }
}

/// Bounded random walk whose speed is whatever the last step realised.
#[derive(Debug, Clone)]
pub struct RandomWalk {
    params: MotionParams,
}

impl RandomWalk {
    pub fn new(params: MotionParams) -> Self {
        Self { params }
    }
}

impl MotionModel for RandomWalk {
    fn kind(&self) -> MotionPolicyKind {
        MotionPolicyKind::RandomWalk
    }

    fn init(&self, entity: &mut Entity, _rng: &mut SmallRng) {
        entity.leg = None;
    }

    fn advance(&self, entity: &mut Entity, rng: &mut SmallRng) -> StepOutcome {
        let heading = rng.gen_range(0.0..TAU);
        let tick_seconds = self.params.tick_seconds;
        let step_degrees = (entity.speed_kmh / SECONDS_PER_HOUR) / KM_PER_DEGREE * tick_seconds;

        let old = entity.position;
        let target = GeoPoint::new(
            old.lat + step_degrees * heading.cos(),
            old.lng + step_degrees * heading.sin(),
        );
        let position = geo::clamp_to_bounds(target, &self.params.bounds);

        // Measured after the clamp, so a move cut short at the edge reads slower
        let realised_km = geo::distance_km(old, position);
        entity.position = position;
        entity.speed_kmh = self.params.speed.clamp(realised_km * SECONDS_PER_HOUR / tick_seconds);

        StepOutcome::Moved { clamped: position != target }
    }
}
