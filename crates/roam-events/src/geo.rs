//! Geographic Types
//!
//! Latitude/longitude points and the bounding box entities live in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS-84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Axis-aligned geographic bounding box.
///
/// `south..=north` is the latitude range and `west..=east` the longitude
/// range. Boxes crossing the antimeridian are not representable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    /// Approximate bounds of Surabaya, East Java.
    pub const SURABAYA: Bounds = Bounds {
        north: -7.2275,
        south: -7.3475,
        east: 112.8021,
        west: 112.7021,
    };

    pub const fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self { north, south, east, west }
    }

    /// Centre of the box.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new((self.north + self.south) / 2.0, (self.east + self.west) / 2.0)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::SURABAYA
    }
}
