//! Engine
//!
//! The command surface a UI or controller talks to: generate, tick, search,
//! select. Owns the population store and the per-viewer query state.

use parking_lot::Mutex;
use roam_events::{EntitySnapshot, PopulationSnapshot};
use std::sync::Arc;

use crate::components::EntityId;
use crate::config::Config;
use crate::error::{EngineError, EngineResult};
use crate::query::{FollowChange, SearchOutcome, SearchSession, Selection};
use crate::setup::{IdSource, IndonesianNames, NameSource, SeededUuids};
use crate::store::{PopulationStore, TickReport};

#[derive(Default)]
struct ViewState {
    search: SearchSession,
    selection: Selection,
}

/// Simulation engine plus search and follow state.
///
/// Lock order is view state first, then the store; regeneration publishes
/// new ids only while holding the view lock.
pub struct Engine {
    config: Config,
    store: PopulationStore,
    view: Mutex<ViewState>,
}

impl Engine {
    /// Validates `config` and builds an empty engine.
    pub fn new(config: Config) -> EngineResult<Self> {
        let store = PopulationStore::new(&config)?;
        Ok(Self {
            config,
            store,
            view: Mutex::new(ViewState::default()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &PopulationStore {
        &self.store
    }

    /// Replaces the population using the built-in name and id providers.
    pub fn generate_population(&self, count: usize) -> EngineResult<()> {
        self.generate_with(count, &mut IndonesianNames, &mut SeededUuids)
    }

    /// Replaces the population using caller-supplied providers.
    ///
    /// Search and follow state refer to the old ids, so both are reset in
    /// the same critical section that publishes the new population. A failed
    /// generation leaves them untouched.
    pub fn generate_with(
        &self,
        count: usize,
        names: &mut dyn NameSource,
        ids: &mut dyn IdSource,
    ) -> EngineResult<()> {
        let mut view = self.view.lock();
        self.store.generate(count, names, ids)?;
        view.search.clear();
        view.selection.clear();
        Ok(())
    }

    /// Advances the simulation by one tick.
    pub fn tick(&self) -> TickReport {
        self.store.advance_tick()
    }

    pub fn snapshot(&self) -> Arc<PopulationSnapshot> {
        self.store.snapshot()
    }

    /// Searches display names in the latest snapshot.
    pub fn search(&self, query: &str) -> SearchOutcome {
        let mut view = self.view.lock();
        let snapshot = self.store.snapshot();
        view.search.search(&snapshot, query).clone()
    }

    pub fn clear_search(&self) {
        self.view.lock().search.clear();
    }

    /// Current query text and outcome.
    pub fn search_state(&self) -> (String, SearchOutcome) {
        let view = self.view.lock();
        (view.search.query().to_string(), view.search.outcome().clone())
    }

    /// Marker-click semantics: toggles off the followed entity, otherwise
    /// follows `id`.
    pub fn select_entity(&self, id: &EntityId) -> EngineResult<FollowChange> {
        let mut view = self.view.lock();
        let snapshot = self.store.snapshot();

        let releasing = view.selection.followed() == Some(id);
        if !releasing && snapshot.find_entity(id.as_str()).is_none() {
            return Err(EngineError::UnknownEntity(id.clone()));
        }

        let change = view.selection.toggle(id.clone());
        log_follow_change(&change);
        Ok(change)
    }

    /// Picking a search result: always follows and closes the search.
    pub fn choose_search_result(&self, id: &EntityId) -> EngineResult<FollowChange> {
        let mut view = self.view.lock();
        let snapshot = self.store.snapshot();
        if snapshot.find_entity(id.as_str()).is_none() {
            return Err(EngineError::UnknownEntity(id.clone()));
        }

        let change = view.selection.follow(id.clone());
        view.search.clear();
        log_follow_change(&change);
        Ok(change)
    }

    pub fn clear_selection(&self) -> FollowChange {
        let change = self.view.lock().selection.clear();
        log_follow_change(&change);
        change
    }

    pub fn followed_id(&self) -> Option<EntityId> {
        self.view.lock().selection.followed().cloned()
    }

    /// The followed entity as of the latest committed tick.
    pub fn followed_entity(&self) -> Option<EntitySnapshot> {
        let view = self.view.lock();
        view.selection.resolve(&self.store.snapshot()).cloned()
    }
}

fn log_follow_change(change: &FollowChange) {
    match change {
        FollowChange::Started(id) => tracing::info!("Following {}", id),
        FollowChange::Switched { from, to } => tracing::info!("Follow switched {} -> {}", from, to),
        FollowChange::Stopped(id) => tracing::info!("Stopped following {}", id),
        FollowChange::Unchanged => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(count: usize) -> Engine {
        let engine = Engine::new(Config::default()).unwrap();
        engine.generate_population(count).unwrap();
        engine
    }

    fn id_at(engine: &Engine, index: usize) -> EntityId {
        EntityId(engine.snapshot().entities[index].id.clone())
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.simulation.population = 0;
        assert!(matches!(Engine::new(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_select_twice_unfollows() {
        let engine = engine_with(3);
        let x = id_at(&engine, 0);

        engine.select_entity(&x).unwrap();
        assert_eq!(engine.followed_id(), Some(x.clone()));

        assert_eq!(engine.select_entity(&x).unwrap(), FollowChange::Stopped(x));
        assert_eq!(engine.followed_id(), None);
    }

    #[test]
    fn test_select_other_switches_directly() {
        let engine = engine_with(3);
        let x = id_at(&engine, 0);
        let y = id_at(&engine, 1);

        engine.select_entity(&x).unwrap();
        let change = engine.select_entity(&y).unwrap();
        assert_eq!(change, FollowChange::Switched { from: x, to: y.clone() });
        assert_eq!(engine.followed_id(), Some(y));
    }

    #[test]
    fn test_select_unknown_entity() {
        let engine = engine_with(2);
        let result = engine.select_entity(&EntityId::from("nobody"));
        assert!(matches!(result, Err(EngineError::UnknownEntity(_))));
        assert_eq!(engine.followed_id(), None);
    }

    #[test]
    fn test_choose_search_result_follows_and_clears() {
        let engine = engine_with(10);
        let first = engine.snapshot().entities[0].clone();
        let given_name = first.display_name.split(' ').next().unwrap().to_string();

        assert!(engine.search(&given_name).results().iter().any(|e| e.id == first.id));

        let id = EntityId(first.id.clone());
        engine.choose_search_result(&id).unwrap();
        // Choosing again keeps following rather than toggling off
        engine.choose_search_result(&id).unwrap();

        assert_eq!(engine.followed_id(), Some(id));
        assert_eq!(engine.search_state(), (String::new(), SearchOutcome::Idle));
    }

    #[test]
    fn test_followed_entity_tracks_ticks() {
        let engine = engine_with(5);
        let x = id_at(&engine, 2);
        engine.select_entity(&x).unwrap();

        engine.tick();
        let followed = engine.followed_entity().unwrap();
        assert_eq!(followed.id, x.as_str());
        assert_eq!(*engine.snapshot().find_entity(x.as_str()).unwrap(), followed);
    }

    #[test]
    fn test_failed_regeneration_keeps_view() {
        let engine = engine_with(5);
        let x = id_at(&engine, 0);
        engine.select_entity(&x).unwrap();
        engine.search("a");

        let result = engine.generate_with(0, &mut IndonesianNames, &mut SeededUuids);
        assert!(matches!(result, Err(EngineError::InvalidCount)));
        assert_eq!(engine.followed_id(), Some(x));
        assert_eq!(engine.search_state().0, "a");
    }

    #[test]
    fn test_selection_during_regeneration_is_consistent() {
        let engine = Arc::new(engine_with(10));

        let regenerator = {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    engine.generate_population(10).unwrap();
                }
            })
        };

        for _ in 0..500 {
            let id = id_at(&engine, 0);
            // May lose the race against a regeneration; that is an error, not a stale follow
            let _ = engine.select_entity(&id);

            let view = engine.view.lock();
            if let Some(followed) = view.selection.followed() {
                assert!(
                    engine.snapshot().find_entity(followed.as_str()).is_some(),
                    "followed id {} is not in the published population",
                    followed
                );
            }
        }
        regenerator.join().unwrap();
    }

    #[test]
    fn test_regeneration_resets_view() {
        let engine = engine_with(5);
        engine.select_entity(&id_at(&engine, 0)).unwrap();
        engine.search("a");

        engine.generate_population(5).unwrap();
        assert_eq!(engine.followed_id(), None);
        assert_eq!(engine.search_state().1, SearchOutcome::Idle);
    }
}
