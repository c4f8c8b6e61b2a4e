//! Population Spawning
//!
//! Builds a batch of entities with random positions, names and identifiers.
//! Names and ids come from injected providers so callers can swap in their
//! own label or UUID sources.

use rand::rngs::SmallRng;
use rand::Rng;
use roam_events::Bounds;
use std::collections::HashSet;

use crate::components::{Entity, EntityId};
use crate::config::SpeedConfig;
use crate::error::{EngineError, EngineResult, ProviderError};
use crate::geo;
use crate::systems::MotionModel;

/// Common Indonesian given names
const GIVEN_NAMES: &[&str] = &[
    "Adi", "Agus", "Ahmad", "Andi", "Anita", "Arief", "Ayu", "Bambang", "Bayu", "Budi",
    "Cahya", "Citra", "Dani", "Dewi", "Dian", "Dimas", "Eka", "Endang", "Fajar", "Fitri",
    "Gilang", "Hadi", "Hendra", "Indah", "Intan", "Joko", "Kartika", "Lestari", "Made", "Mega",
    "Nanda", "Nur", "Putri", "Rahmat", "Rina", "Rizky", "Sari", "Siti", "Slamet", "Sri",
    "Teguh", "Tri", "Wahyu", "Wulan", "Yanti", "Yogi", "Yudi", "Yuni", "Zahra", "Zainal",
];

/// Common Indonesian family names
const FAMILY_NAMES: &[&str] = &[
    "Hidayat", "Kurniawan", "Lestari", "Nugroho", "Pratama", "Purnomo", "Putra", "Rahayu", "Saputra", "Setiawan",
    "Siregar", "Susanto", "Wibowo", "Wijaya", "Gunawan", "Halim", "Haryanto", "Hutagalung", "Irawan", "Kusuma",
    "Lubis", "Manurung", "Nasution", "Permana", "Prasetyo", "Santoso", "Simanjuntak", "Sitompul", "Suryadi", "Tanjung",
];

/// Supplies display names for new entities.
pub trait NameSource {
    fn next_name(&mut self, rng: &mut SmallRng) -> Result<String, ProviderError>;
}

/// Supplies unique identifiers for new entities.
pub trait IdSource {
    fn next_id(&mut self, rng: &mut SmallRng) -> Result<EntityId, ProviderError>;
}

/// Random "Given Family" names drawn from built-in lists
#[derive(Debug, Clone, Copy, Default)]
pub struct IndonesianNames;

impl NameSource for IndonesianNames {
    fn next_name(&mut self, rng: &mut SmallRng) -> Result<String, ProviderError> {
        let given = GIVEN_NAMES[rng.gen_range(0..GIVEN_NAMES.len())];
        let family = FAMILY_NAMES[rng.gen_range(0..FAMILY_NAMES.len())];
        Ok(format!("{} {}", given, family))
    }
}

/// Version 4 UUIDs built from the simulation RNG, so a seed reproduces ids
#[derive(Debug, Clone, Copy, Default)]
pub struct SeededUuids;

impl IdSource for SeededUuids {
    fn next_id(&mut self, rng: &mut SmallRng) -> Result<EntityId, ProviderError> {
        let bytes: [u8; 16] = rng.gen();
        let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
        Ok(EntityId(uuid.to_string()))
    }
}

/// Parameters for one generation batch
pub struct SpawnConfig<'a> {
    pub count: usize,
    pub bounds: &'a Bounds,
    pub speed: SpeedConfig,
    pub motion: &'a dyn MotionModel,
}

/// Builds `count` independent entities.
///
/// Fails as a whole on the first provider error or repeated id; nothing is
/// returned partially built.
pub fn spawn_population(
    config: &SpawnConfig<'_>,
    names: &mut dyn NameSource,
    ids: &mut dyn IdSource,
    rng: &mut SmallRng,
) -> EngineResult<Vec<Entity>> {
    if config.count == 0 {
        return Err(EngineError::InvalidCount);
    }

    let mut seen = HashSet::with_capacity(config.count);
    let mut entities = Vec::with_capacity(config.count);

    for _ in 0..config.count {
        let id = ids.next_id(rng).map_err(EngineError::IdProvider)?;
        if !seen.insert(id.clone()) {
            return Err(EngineError::DuplicateId(id));
        }
        let name = names.next_name(rng).map_err(EngineError::NameProvider)?;

        let position = geo::random_point(config.bounds, rng);
        let speed = initial_speed(&config.speed, rng);

        let mut entity = Entity::new(id, name, position, speed);
        config.motion.init(&mut entity, rng);
        entities.push(entity);
    }

    Ok(entities)
}

/// Uniform over the configured range
fn initial_speed(speed: &SpeedConfig, rng: &mut SmallRng) -> f64 {
    speed.min_kmh + rng.gen::<f64>() * (speed.max_kmh - speed.min_kmh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::systems::motion_model_for;
    use rand::SeedableRng;

    struct FixedIds(Vec<&'static str>);

    impl IdSource for FixedIds {
        fn next_id(&mut self, _rng: &mut SmallRng) -> Result<EntityId, ProviderError> {
            if self.0.is_empty() {
                return Err(ProviderError::new("exhausted"));
            }
            Ok(EntityId::from(self.0.remove(0)))
        }
    }

    fn spawn(count: usize, ids: &mut dyn IdSource) -> EngineResult<Vec<Entity>> {
        let config = Config::default();
        let motion = motion_model_for(&config);
        let spawn_config = SpawnConfig {
            count,
            bounds: &config.bounds,
            speed: config.speed,
            motion: motion.as_ref(),
        };
        let mut rng = SmallRng::seed_from_u64(42);
        spawn_population(&spawn_config, &mut IndonesianNames, ids, &mut rng)
    }

    #[test]
    fn test_name_generation() {
        let mut rng = SmallRng::seed_from_u64(42);
        let name = IndonesianNames.next_name(&mut rng).unwrap();
        let parts: Vec<&str> = name.split(' ').collect();
        assert_eq!(parts.len(), 2);
        assert!(GIVEN_NAMES.contains(&parts[0]));
        assert!(FAMILY_NAMES.contains(&parts[1]));
    }

    #[test]
    fn test_seeded_uuids_are_v4_and_reproducible() {
        let mut rng1 = SmallRng::seed_from_u64(9);
        let mut rng2 = SmallRng::seed_from_u64(9);
        let a = SeededUuids.next_id(&mut rng1).unwrap();
        let b = SeededUuids.next_id(&mut rng2).unwrap();
        assert_eq!(a, b);

        let parsed = uuid::Uuid::parse_str(a.as_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn test_spawn_in_bounds_with_legs() {
        let entities = spawn(50, &mut SeededUuids).unwrap();
        assert_eq!(entities.len(), 50);
        for entity in &entities {
            assert!(geo::contains(&Bounds::SURABAYA, entity.position));
            assert!((0.0..=80.0).contains(&entity.speed_kmh));
            let leg = entity.leg.expect("path-following entities start with a leg");
            assert_eq!(leg.start, entity.position);
            assert_eq!(leg.progress, 0.0);
        }
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(matches!(spawn(0, &mut SeededUuids), Err(EngineError::InvalidCount)));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut ids = FixedIds(vec!["a", "b", "a"]);
        assert!(matches!(spawn(3, &mut ids), Err(EngineError::DuplicateId(id)) if id.as_str() == "a"));
    }

    #[test]
    fn test_provider_failure_surfaces() {
        let mut ids = FixedIds(vec!["a"]);
        assert!(matches!(spawn(2, &mut ids), Err(EngineError::IdProvider(_))));
    }
}
