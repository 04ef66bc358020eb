//! In-memory stores backed by concurrent maps.

use dashmap::DashMap;
use escape_rules::{SavedSnapshot, SessionId, SessionState, SnapshotId};

use crate::error::StoreError;
use crate::ports::{SessionStore, SnapshotStore};

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<SessionId, SessionState>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, id: SessionId) -> Result<Option<SessionState>, StoreError> {
        Ok(self.sessions.get(&id).map(|entry| entry.value().clone()))
    }

    fn put(&self, session: SessionState) -> Result<(), StoreError> {
        match self.sessions.get_mut(&session.id) {
            Some(mut entry) => {
                *entry = session;
                Ok(())
            }
            None => Err(StoreError::not_found("Session", session.id)),
        }
    }

    fn create(&self, mut session: SessionState) -> Result<SessionId, StoreError> {
        let id = SessionId::new();
        session.id = id;
        self.sessions.insert(id, session);
        Ok(id)
    }

    fn delete(&self, id: SessionId) -> Result<bool, StoreError> {
        Ok(self.sessions.remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct InMemorySnapshotStore {
    snapshots: DashMap<SnapshotId, SavedSnapshot>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn insert(&self, snapshot: SavedSnapshot) -> Result<(), StoreError> {
        self.snapshots.insert(snapshot.id, snapshot);
        Ok(())
    }

    fn get(&self, id: SnapshotId) -> Result<Option<SavedSnapshot>, StoreError> {
        Ok(self.snapshots.get(&id).map(|entry| entry.value().clone()))
    }

    fn list_for_player(&self, player_id: &str) -> Result<Vec<SavedSnapshot>, StoreError> {
        let mut saves: Vec<SavedSnapshot> = self
            .snapshots
            .iter()
            .filter(|entry| entry.player_id == player_id)
            .map(|entry| entry.value().clone())
            .collect();
        saves.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(saves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn session(player: &str) -> SessionState {
        SessionState::new(player, "mystery", "ancient_library", "medium", Utc::now())
    }

    #[test]
    fn test_session_crud() {
        let store = InMemorySessionStore::new();
        let id = store.create(session("p1")).unwrap();

        let mut stored = store.get(id).unwrap().unwrap();
        assert_eq!(stored.id, id);

        stored.add_item("brass_key");
        store.put(stored).unwrap();
        assert!(store.get(id).unwrap().unwrap().has_item("brass_key"));

        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());
        assert!(store.get(id).unwrap().is_none());
    }

    #[test]
    fn test_put_requires_existing_record() {
        let store = InMemorySessionStore::new();
        let mut orphan = session("p1");
        orphan.id = SessionId::new();
        assert!(store.put(orphan).unwrap_err().is_not_found());
    }

    #[test]
    fn test_saves_listed_newest_first() {
        let store = InMemorySnapshotStore::new();
        let base = Utc::now();
        let mut live = session("p1");
        live.id = SessionId::new();

        for (name, offset) in [("first", 0), ("third", 20), ("second", 10)] {
            let snapshot =
                SavedSnapshot::capture(&live, name, base + Duration::seconds(offset)).unwrap();
            store.insert(snapshot).unwrap();
        }
        let other = SavedSnapshot::capture(&session("p2"), "theirs", base).unwrap();
        store.insert(other).unwrap();

        let names: Vec<_> = store
            .list_for_player("p1")
            .unwrap()
            .into_iter()
            .map(|s| s.save_name)
            .collect();
        assert_eq!(names, vec!["third", "second", "first"]);
        assert!(store.list_for_player("nobody").unwrap().is_empty());
    }
}
