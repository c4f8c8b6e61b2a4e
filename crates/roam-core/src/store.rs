//! Population Store
//!
//! Owns every entity and is the only thing that mutates them. Ticks are
//! serialised through a writer lock; readers get the last committed snapshot
//! as a shared `Arc`, so a reader never observes a tick half-applied.

use parking_lot::{Mutex, RwLock};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use roam_events::{Bounds, MotionPolicyKind, PopulationSnapshot};
use serde::Serialize;
use std::sync::Arc;

use crate::components::{Entity, EntityId};
use crate::config::{Config, SpeedConfig};
use crate::error::{ConfigResult, EngineResult};
use crate::setup::{spawn_population, IdSource, NameSource, SpawnConfig};
use crate::systems::{motion_model_for, MotionModel, StepOutcome};

/// Summary of one committed tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub entities: usize,
    pub moved: usize,
    pub replanned: usize,
    pub degenerate_legs: usize,
    pub clamped: usize,
    pub mean_speed_kmh: f64,
    pub max_speed_kmh: f64,
}

impl TickReport {
    fn from_outcomes(tick: u64, outcomes: &[StepOutcome], entities: &[Entity]) -> Self {
        let mut report = TickReport {
            tick,
            entities: entities.len(),
            ..Default::default()
        };

        for outcome in outcomes {
            match outcome {
                StepOutcome::Moved { clamped } => {
                    report.moved += 1;
                    if *clamped {
                        report.clamped += 1;
                    }
                }
                StepOutcome::Replanned => report.replanned += 1,
                StepOutcome::DegenerateLeg => report.degenerate_legs += 1,
            }
        }

        if !entities.is_empty() {
            let total: f64 = entities.iter().map(|e| e.speed_kmh).sum();
            report.mean_speed_kmh = total / entities.len() as f64;
            report.max_speed_kmh = entities.iter().map(|e| e.speed_kmh).fold(0.0, f64::max);
        }

        report
    }
}

/// Mutable state touched only while holding the writer lock
struct WriterState {
    rng: SmallRng,
    entities: Vec<Entity>,
    tick: u64,
}

/// The entity collection plus its active motion policy
pub struct PopulationStore {
    bounds: Bounds,
    speed: SpeedConfig,
    motion: Box<dyn MotionModel>,
    writer: Mutex<WriterState>,
    published: RwLock<Arc<PopulationSnapshot>>,
}

impl PopulationStore {
    /// Creates an empty store running the configured motion policy.
    pub fn new(config: &Config) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::with_motion(config, motion_model_for(config)))
    }

    /// Creates an empty store with an explicit motion model.
    ///
    /// The caller is responsible for having validated `config`.
    pub fn with_motion(config: &Config, motion: Box<dyn MotionModel>) -> Self {
        let policy = motion.kind();
        Self {
            bounds: config.bounds,
            speed: config.speed,
            motion,
            writer: Mutex::new(WriterState {
                rng: SmallRng::seed_from_u64(config.simulation.seed),
                entities: Vec::new(),
                tick: 0,
            }),
            published: RwLock::new(Arc::new(PopulationSnapshot::empty(policy))),
        }
    }

    pub fn policy(&self) -> MotionPolicyKind {
        self.motion.kind()
    }

    /// Replaces the whole population with `count` new entities.
    ///
    /// On error the previous population and snapshot are left as they were.
    pub fn generate(
        &self,
        count: usize,
        names: &mut dyn NameSource,
        ids: &mut dyn IdSource,
    ) -> EngineResult<()> {
        let mut writer = self.writer.lock();
        let spawn_config = SpawnConfig {
            count,
            bounds: &self.bounds,
            speed: self.speed,
            motion: self.motion.as_ref(),
        };
        let entities = spawn_population(&spawn_config, names, ids, &mut writer.rng)?;

        writer.entities = entities;
        writer.tick = 0;
        self.publish(0, &writer.entities);

        tracing::info!(
            "Generated {} entities ({} policy)",
            writer.entities.len(),
            self.policy().as_str()
        );
        Ok(())
    }

    /// Applies the motion policy to every entity and commits the result.
    ///
    /// Entities are updated in parallel. Each one gets its own RNG stream
    /// seeded from the store RNG in collection order, so a run is
    /// reproducible regardless of how rayon schedules the work.
    pub fn advance_tick(&self) -> TickReport {
        let mut writer = self.writer.lock();
        let WriterState { rng, entities, tick } = &mut *writer;

        if entities.is_empty() {
            return TickReport {
                tick: *tick,
                ..Default::default()
            };
        }

        let seeds: Vec<u64> = (0..entities.len()).map(|_| rng.gen()).collect();
        let motion = self.motion.as_ref();

        let outcomes: Vec<StepOutcome> = entities
            .par_iter_mut()
            .zip(seeds.par_iter())
            .map(|(entity, &seed)| {
                let mut entity_rng = SmallRng::seed_from_u64(seed);
                motion.advance(entity, &mut entity_rng)
            })
            .collect();

        *tick += 1;
        self.publish(*tick, entities);

        let report = TickReport::from_outcomes(*tick, &outcomes, entities);
        tracing::debug!(
            "Tick {} committed: {} moved, {} replanned, {} clamped, mean speed {:.1} km/h",
            report.tick,
            report.moved,
            report.replanned,
            report.clamped,
            report.mean_speed_kmh
        );
        report
    }

    /// The last committed state.
    pub fn snapshot(&self) -> Arc<PopulationSnapshot> {
        self.published.read().clone()
    }

    /// Current state of one entity; waits for an in-flight tick to finish.
    pub fn entity(&self, id: &EntityId) -> Option<Entity> {
        self.writer.lock().entities.iter().find(|e| &e.id == id).cloned()
    }

    /// Number of committed ticks since the last generation.
    pub fn tick(&self) -> u64 {
        self.snapshot().tick
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    fn publish(&self, tick: u64, entities: &[Entity]) {
        let snapshot = PopulationSnapshot::new(
            tick,
            self.policy(),
            entities.iter().map(Entity::to_snapshot).collect(),
        );
        *self.published.write() = Arc::new(snapshot);
    }
}
