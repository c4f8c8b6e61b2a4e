//! Entity Components
//!
//! The moving entity and its path leg.

use roam_events::{EntitySnapshot, GeoPoint, LegSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an entity
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The start-to-destination leg a path-following entity is travelling.
///
/// `start` and `end` are fixed for the life of the leg. `midpoint` is the
/// jittered waypoint rolled when the leg was planned; it is only used when
/// jitter is held per leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathLeg {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub midpoint: GeoPoint,
    /// 0.0 to 1.0, non-decreasing until the leg is replaced
    pub progress: f64,
}

impl PathLeg {
    pub fn new(start: GeoPoint, end: GeoPoint, midpoint: GeoPoint) -> Self {
        Self {
            start,
            end,
            midpoint,
            progress: 0.0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }
}

/// A simulated vehicle or pedestrian
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub display_name: String,
    pub position: GeoPoint,
    pub speed_kmh: f64,
    /// Present only under the path-following policy
    pub leg: Option<PathLeg>,
}

impl Entity {
    pub fn new(id: EntityId, display_name: impl Into<String>, position: GeoPoint, speed_kmh: f64) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            position,
            speed_kmh,
            leg: None,
        }
    }

    pub fn with_leg(mut self, leg: PathLeg) -> Self {
        self.leg = Some(leg);
        self
    }

    pub fn to_snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id.0.clone(),
            display_name: self.display_name.clone(),
            latitude: self.position.lat,
            longitude: self.position.lng,
            speed_kmh: self.speed_kmh,
            leg: self.leg.map(|leg| LegSnapshot {
                start: leg.start,
                end: leg.end,
                progress: leg.progress,
            }),
        }
    }
}
