//! Geographic math: great-circle distance, bounds clamping and sampling.

use rand::Rng;
use roam_events::{Bounds, GeoPoint};

use crate::error::{ConfigError, ConfigResult};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometres per degree of arc, equator approximation.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Haversine great-circle distance in kilometres.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Clamps latitude into `[south, north]` and longitude into `[west, east]`.
pub fn clamp_to_bounds(point: GeoPoint, bounds: &Bounds) -> GeoPoint {
    GeoPoint::new(
        point.lat.clamp(bounds.south, bounds.north),
        point.lng.clamp(bounds.west, bounds.east),
    )
}

/// Whether the point lies inside the box, edges included.
pub fn contains(bounds: &Bounds, point: GeoPoint) -> bool {
    (bounds.south..=bounds.north).contains(&point.lat)
        && (bounds.west..=bounds.east).contains(&point.lng)
}

/// Uniform draw on each axis independently.
///
/// Not area-uniform on the sphere; at city scale the difference is negligible.
pub fn random_point<R: Rng + ?Sized>(bounds: &Bounds, rng: &mut R) -> GeoPoint {
    GeoPoint::new(
        sample_range(bounds.south, bounds.north, rng),
        sample_range(bounds.west, bounds.east, rng),
    )
}

fn sample_range<R: Rng + ?Sized>(min: f64, max: f64, rng: &mut R) -> f64 {
    min + rng.gen::<f64>() * (max - min)
}

/// Rejects boxes the engine cannot work with. Malformed bounds are never
/// corrected, only reported.
pub fn validate_bounds(bounds: &Bounds) -> ConfigResult<()> {
    let edges = [bounds.north, bounds.south, bounds.east, bounds.west];
    if edges.iter().any(|e| !e.is_finite()) {
        return Err(ConfigError::InvalidBounds {
            reason: "edges must be finite numbers".to_string(),
        });
    }
    if bounds.south > bounds.north {
        return Err(ConfigError::InvalidBounds {
            reason: format!("south {} is above north {}", bounds.south, bounds.north),
        });
    }
    if bounds.west > bounds.east {
        return Err(ConfigError::InvalidBounds {
            reason: format!("west {} is east of east {}", bounds.west, bounds.east),
        });
    }
    if bounds.north > 90.0 || bounds.south < -90.0 {
        return Err(ConfigError::InvalidBounds {
            reason: "latitude outside [-90, 90]".to_string(),
        });
    }
    if bounds.east > 180.0 || bounds.west < -180.0 {
        return Err(ConfigError::InvalidBounds {
            reason: "longitude outside [-180, 180]".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const SURABAYA: Bounds = Bounds::SURABAYA;

    #[test]
    fn test_distance_zero_for_same_point() {
        let p = GeoPoint::new(-7.2575, 112.7521);
        assert_eq!(distance_km(p, p), 0.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            let a = random_point(&SURABAYA, &mut rng);
            let b = random_point(&SURABAYA, &mut rng);
            assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        // One degree of latitude is about 111.19 km on a 6371 km sphere
        let d = distance_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!((d - 111.195).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_distance_monotonic() {
        let origin = GeoPoint::new(-7.3, 112.7);
        let near = distance_km(origin, GeoPoint::new(-7.3, 112.71));
        let far = distance_km(origin, GeoPoint::new(-7.3, 112.75));
        assert!(near < far);
    }

    #[test]
    fn test_clamp_idempotent() {
        let outside = GeoPoint::new(-7.0, 113.5);
        let once = clamp_to_bounds(outside, &SURABAYA);
        let twice = clamp_to_bounds(once, &SURABAYA);
        assert_eq!(once, twice);
        assert_eq!(once, GeoPoint::new(SURABAYA.north, SURABAYA.east));

        let inside = GeoPoint::new(-7.3, 112.75);
        assert_eq!(clamp_to_bounds(inside, &SURABAYA), inside);
    }

    #[test]
    fn test_random_point_within_bounds() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..1000 {
            assert!(contains(&SURABAYA, random_point(&SURABAYA, &mut rng)));
        }
    }

    #[test]
    fn test_validate_bounds() {
        assert!(validate_bounds(&SURABAYA).is_ok());
        assert!(validate_bounds(&Bounds::new(-7.4, -7.2, 112.8, 112.7)).is_err());
        assert!(validate_bounds(&Bounds::new(-7.2, -7.4, 112.7, 112.8)).is_err());
        assert!(validate_bounds(&Bounds::new(f64::NAN, -7.4, 112.8, 112.7)).is_err());
        assert!(validate_bounds(&Bounds::new(95.0, 10.0, 112.8, 112.7)).is_err());
        // A single point is a valid, if degenerate, box
        assert!(validate_bounds(&Bounds::new(1.0, 1.0, 2.0, 2.0)).is_ok());
    }
}
