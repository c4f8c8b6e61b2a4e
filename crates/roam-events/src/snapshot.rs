//! Snapshot Types
//!
//! Serialization structs for the population state published after each tick.
//!
//! A snapshot is what a map renderer reads: one record per entity with its
//! position and speed, plus the current path leg when entities follow paths.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Generates a snapshot ID for the given tick.
pub fn generate_snapshot_id(tick: u64) -> String {
    format!("snap_{:06}", tick)
}

/// Which motion model produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MotionPolicyKind {
    /// Entities travel along planned start-to-destination legs.
    #[default]
    PathFollowing,
    /// Entities take a random heading every tick.
    RandomWalk,
}

impl MotionPolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionPolicyKind::PathFollowing => "path_following",
            MotionPolicyKind::RandomWalk => "random_walk",
        }
    }
}

impl std::str::FromStr for MotionPolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path_following" | "path-following" => Ok(MotionPolicyKind::PathFollowing),
            "random_walk" | "random-walk" => Ok(MotionPolicyKind::RandomWalk),
            other => Err(format!("unknown motion policy: {}", other)),
        }
    }
}

/// Current leg of a path-following entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegSnapshot {
    pub start: GeoPoint,
    pub end: GeoPoint,
    /// Fraction of the leg covered, 0.0 to 1.0
    pub progress: f64,
}

/// One entity as seen by consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: String,
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leg: Option<LegSnapshot>,
}

impl EntitySnapshot {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Complete population state after a committed tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub snapshot_id: String,
    /// Number of ticks committed so far; 0 right after generation
    pub tick: u64,
    pub policy: MotionPolicyKind,
    pub entities: Vec<EntitySnapshot>,
}

impl PopulationSnapshot {
    /// Creates an empty snapshot.
    pub fn empty(policy: MotionPolicyKind) -> Self {
        Self::new(0, policy, Vec::new())
    }

    pub fn new(tick: u64, policy: MotionPolicyKind, entities: Vec<EntitySnapshot>) -> Self {
        Self {
            snapshot_id: generate_snapshot_id(tick),
            tick,
            policy,
            entities,
        }
    }

    /// Finds an entity by ID.
    pub fn find_entity(&self, id: &str) -> Option<&EntitySnapshot> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Serializes the snapshot to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serializes the snapshot to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
