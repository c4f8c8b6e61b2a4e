//! Query Layer
//!
//! Name search and follow/select bookkeeping over the latest snapshot.
//! Nothing here mutates entities.

use roam_events::{EntitySnapshot, PopulationSnapshot};

use crate::components::EntityId;

/// Result of a name search.
///
/// `Idle` and an empty `Matches` are different states: the first means no
/// query is active, the second that a query found nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchOutcome {
    #[default]
    Idle,
    Matches(Vec<EntitySnapshot>),
}

impl SearchOutcome {
    pub fn is_searching(&self) -> bool {
        matches!(self, SearchOutcome::Matches(_))
    }

    /// Matching entities; empty when idle.
    pub fn results(&self) -> &[EntitySnapshot] {
        match self {
            SearchOutcome::Idle => &[],
            SearchOutcome::Matches(matches) => matches,
        }
    }

    /// Searching, but nothing matched
    pub fn is_empty_search(&self) -> bool {
        matches!(self, SearchOutcome::Matches(m) if m.is_empty())
    }
}

/// Case-insensitive substring match on display names, in snapshot order.
pub fn search(snapshot: &PopulationSnapshot, query: &str) -> SearchOutcome {
    if query.trim().is_empty() {
        return SearchOutcome::Idle;
    }

    let needle = query.to_lowercase();
    let matches = snapshot
        .entities
        .iter()
        .filter(|e| e.display_name.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    SearchOutcome::Matches(matches)
}

/// The current query text and what it found
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    query: String,
    outcome: SearchOutcome,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `query` against `snapshot` and remembers both.
    pub fn search(&mut self, snapshot: &PopulationSnapshot, query: &str) -> &SearchOutcome {
        self.query = query.to_string();
        self.outcome = search(snapshot, query);
        &self.outcome
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.outcome = SearchOutcome::Idle;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn outcome(&self) -> &SearchOutcome {
        &self.outcome
    }
}

/// How a selection command changed the followed entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowChange {
    Started(EntityId),
    Switched { from: EntityId, to: EntityId },
    Stopped(EntityId),
    Unchanged,
}

/// Which entity, if any, the camera follows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    followed: Option<EntityId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Click-to-toggle: the followed entity is released, any other becomes
    /// the new target directly.
    pub fn toggle(&mut self, id: EntityId) -> FollowChange {
        match self.followed.take() {
            Some(current) if current == id => FollowChange::Stopped(current),
            Some(current) => {
                self.followed = Some(id.clone());
                FollowChange::Switched { from: current, to: id }
            }
            None => {
                self.followed = Some(id.clone());
                FollowChange::Started(id)
            }
        }
    }

    /// Follows `id` without toggling.
    pub fn follow(&mut self, id: EntityId) -> FollowChange {
        match self.followed.replace(id.clone()) {
            Some(current) if current == id => FollowChange::Unchanged,
            Some(current) => FollowChange::Switched { from: current, to: id },
            None => FollowChange::Started(id),
        }
    }

    pub fn clear(&mut self) -> FollowChange {
        match self.followed.take() {
            Some(current) => FollowChange::Stopped(current),
            None => FollowChange::Unchanged,
        }
    }

    pub fn followed(&self) -> Option<&EntityId> {
        self.followed.as_ref()
    }

    pub fn is_following(&self) -> bool {
        self.followed.is_some()
    }

    /// The followed entity as it appears in `snapshot`.
    pub fn resolve<'a>(&self, snapshot: &'a PopulationSnapshot) -> Option<&'a EntitySnapshot> {
        self.followed.as_ref().and_then(|id| snapshot.find_entity(id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roam_events::MotionPolicyKind;

    fn entity(id: &str, name: &str) -> EntitySnapshot {
        EntitySnapshot {
            id: id.to_string(),
            display_name: name.to_string(),
            latitude: -7.3,
            longitude: 112.75,
            speed_kmh: 20.0,
            leg: None,
        }
    }

    fn snapshot() -> PopulationSnapshot {
        PopulationSnapshot::new(
            0,
            MotionPolicyKind::PathFollowing,
            vec![
                entity("1", "Budi Santoso"),
                entity("2", "Siti Rahayu"),
                entity("3", "Budiman Lubis"),
            ],
        )
    }

    #[test]
    fn test_blank_query_is_idle() {
        let outcome = search(&snapshot(), "");
        assert_eq!(outcome, SearchOutcome::Idle);
        assert!(!outcome.is_searching());

        assert_eq!(search(&snapshot(), "   \t"), SearchOutcome::Idle);
    }

    #[test]
    fn test_no_match_is_distinct_from_idle() {
        let outcome = search(&snapshot(), "zzz-no-match");
        assert!(outcome.is_searching());
        assert!(outcome.is_empty_search());
        assert!(outcome.results().is_empty());
        assert_ne!(outcome, SearchOutcome::Idle);
    }

    #[test]
    fn test_case_insensitive_substring() {
        let outcome = search(&snapshot(), "BUDI");
        let ids: Vec<&str> = outcome.results().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        assert_eq!(search(&snapshot(), "rahayu").results().len(), 1);
    }

    #[test]
    fn test_search_on_empty_population() {
        let empty = PopulationSnapshot::empty(MotionPolicyKind::PathFollowing);
        assert!(search(&empty, "budi").is_empty_search());
    }

    #[test]
    fn test_session_clear() {
        let mut session = SearchSession::new();
        session.search(&snapshot(), "siti");
        assert_eq!(session.query(), "siti");
        assert_eq!(session.outcome().results().len(), 1);

        session.clear();
        assert_eq!(session.query(), "");
        assert_eq!(*session.outcome(), SearchOutcome::Idle);
    }

    #[test]
    fn test_toggle_same_entity_unfollows() {
        let mut selection = Selection::new();
        let x = EntityId::from("x");

        assert_eq!(selection.toggle(x.clone()), FollowChange::Started(x.clone()));
        assert_eq!(selection.toggle(x.clone()), FollowChange::Stopped(x));
        assert!(!selection.is_following());
    }

    #[test]
    fn test_toggle_other_entity_switches() {
        let mut selection = Selection::new();
        let x = EntityId::from("x");
        let y = EntityId::from("y");

        selection.toggle(x.clone());
        assert_eq!(
            selection.toggle(y.clone()),
            FollowChange::Switched { from: x, to: y.clone() }
        );
        assert_eq!(selection.followed(), Some(&y));
    }

    #[test]
    fn test_follow_does_not_toggle() {
        let mut selection = Selection::new();
        let x = EntityId::from("x");

        selection.follow(x.clone());
        assert_eq!(selection.follow(x.clone()), FollowChange::Unchanged);
        assert_eq!(selection.followed(), Some(&x));

        assert_eq!(selection.clear(), FollowChange::Stopped(x));
        assert_eq!(selection.clear(), FollowChange::Unchanged);
    }

    #[test]
    fn test_resolve_followed() {
        let mut selection = Selection::new();
        let snap = snapshot();
        assert!(selection.resolve(&snap).is_none());

        selection.follow(EntityId::from("2"));
        assert_eq!(selection.resolve(&snap).map(|e| e.display_name.as_str()), Some("Siti Rahayu"));
    }
}
