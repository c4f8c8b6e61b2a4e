//! Path Planner
//!
//! Picks destinations and builds the two-point waypoint path for a leg.

use rand::Rng;
use roam_events::{Bounds, GeoPoint};

use crate::geo;

/// Parametric position of the jittered waypoint along a leg
pub const MIDPOINT_FRACTION: f64 = 0.5;

/// A leg's path: the literal start and one jittered midpoint.
///
/// Interpolation only ever runs between these two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoints(pub [GeoPoint; 2]);

impl Waypoints {
    pub fn start(&self) -> GeoPoint {
        self.0[0]
    }

    pub fn midpoint(&self) -> GeoPoint {
        self.0[1]
    }
}

/// Random destination anywhere in bounds.
pub fn plan_leg<R: Rng + ?Sized>(bounds: &Bounds, rng: &mut R) -> GeoPoint {
    geo::random_point(bounds, rng)
}

/// Midpoint of `start..end` nudged by up to half of `jitter_degrees` on each
/// axis, then pulled back into bounds.
pub fn jittered_midpoint<R: Rng + ?Sized>(
    start: GeoPoint,
    end: GeoPoint,
    bounds: &Bounds,
    jitter_degrees: f64,
    rng: &mut R,
) -> GeoPoint {
    let lat = start.lat + (end.lat - start.lat) * MIDPOINT_FRACTION;
    let lng = start.lng + (end.lng - start.lng) * MIDPOINT_FRACTION;

    let jittered = GeoPoint::new(
        lat + (rng.gen::<f64>() - 0.5) * jitter_degrees,
        lng + (rng.gen::<f64>() - 0.5) * jitter_degrees,
    );
    geo::clamp_to_bounds(jittered, bounds)
}

/// Builds `[start, jittered midpoint]` for a leg.
pub fn build_waypoints<R: Rng + ?Sized>(
    start: GeoPoint,
    end: GeoPoint,
    bounds: &Bounds,
    jitter_degrees: f64,
    rng: &mut R,
) -> Waypoints {
    Waypoints([start, jittered_midpoint(start, end, bounds, jitter_degrees, rng)])
}

/// Linear interpolation between the first two waypoints.
pub fn interpolate(waypoints: &Waypoints, progress: f64) -> GeoPoint {
    let from = waypoints.start();
    let to = waypoints.midpoint();
    GeoPoint::new(
        from.lat + (to.lat - from.lat) * progress,
        from.lng + (to.lng - from.lng) * progress,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const BOUNDS: Bounds = Bounds::SURABAYA;

    #[test]
    fn test_plan_leg_in_bounds() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..500 {
            assert!(geo::contains(&BOUNDS, plan_leg(&BOUNDS, &mut rng)));
        }
    }

    #[test]
    fn test_waypoints_without_jitter_hit_exact_midpoint() {
        let mut rng = SmallRng::seed_from_u64(2);
        let start = GeoPoint::new(-7.34, 112.71);
        let end = GeoPoint::new(-7.24, 112.79);

        let waypoints = build_waypoints(start, end, &BOUNDS, 0.0, &mut rng);
        assert_eq!(waypoints.start(), start);
        assert!((waypoints.midpoint().lat - -7.29).abs() < 1e-12);
        assert!((waypoints.midpoint().lng - 112.75).abs() < 1e-12);
    }

    #[test]
    fn test_jitter_stays_within_window() {
        let mut rng = SmallRng::seed_from_u64(3);
        let start = GeoPoint::new(-7.34, 112.71);
        let end = GeoPoint::new(-7.24, 112.79);
        let jitter = 0.001;

        for _ in 0..200 {
            let mid = jittered_midpoint(start, end, &BOUNDS, jitter, &mut rng);
            assert!((mid.lat - -7.29).abs() <= jitter / 2.0 + 1e-12);
            assert!((mid.lng - 112.75).abs() <= jitter / 2.0 + 1e-12);
        }
    }

    #[test]
    fn test_jittered_midpoint_reclamped() {
        let mut rng = SmallRng::seed_from_u64(4);
        let corner = GeoPoint::new(BOUNDS.north, BOUNDS.east);

        for _ in 0..200 {
            let mid = jittered_midpoint(corner, corner, &BOUNDS, 0.5, &mut rng);
            assert!(geo::contains(&BOUNDS, mid));
        }
    }

    #[test]
    fn test_interpolate_endpoints() {
        let waypoints = Waypoints([GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 2.0)]);
        assert_eq!(interpolate(&waypoints, 0.0), GeoPoint::new(0.0, 0.0));
        assert_eq!(interpolate(&waypoints, 1.0), GeoPoint::new(1.0, 2.0));
        assert_eq!(interpolate(&waypoints, 0.5), GeoPoint::new(0.5, 1.0));
    }
}
