//! Saving and restoring sessions.

use escape_rules::{SavedSnapshot, SessionId, SnapshotId};
use std::sync::PoisonError;

use super::{ActionOutcome, GameEngine, Step};
use crate::error::EngineError;
use crate::resolution::current_room;

const DEFAULT_SAVE_NAME: &str = "Saved game";

impl GameEngine {
    /// Save a full copy of a session under `name`.
    pub fn save(&self, session_id: SessionId, name: &str) -> Result<SavedSnapshot, EngineError> {
        let lock = self.lock_for(session_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let session = self.load_locked(session_id)?;
        let name = if name.trim().is_empty() {
            DEFAULT_SAVE_NAME
        } else {
            name.trim()
        };
        let snapshot = SavedSnapshot::capture(&session, name, self.clock.now())?;
        self.snapshots.insert(snapshot.clone())?;

        tracing::info!(
            session_id = %session_id,
            snapshot_id = %snapshot.id,
            save_name = %snapshot.save_name,
            "Game saved"
        );
        Ok(snapshot)
    }

    /// Restore a snapshot onto the session it was taken from.
    pub fn load(&self, snapshot_id: SnapshotId) -> Result<ActionOutcome, EngineError> {
        let snapshot = self
            .snapshots
            .get(snapshot_id)?
            .ok_or(EngineError::SnapshotNotFound(snapshot_id))?;

        self.act(snapshot.session_id, |theme, session, _| {
            let mut restored = session.clone();
            snapshot.restore_onto(&mut restored)?;
            if restored.theme != theme.id {
                return Err(EngineError::configuration(format!(
                    "Snapshot {} belongs to theme {}, session plays {}",
                    snapshot.id, restored.theme, theme.id
                )));
            }
            current_room(theme, &restored)?;

            *session = restored;
            tracing::info!(
                session_id = %session.id,
                snapshot_id = %snapshot.id,
                "Game loaded"
            );
            Ok(Step::done(format!("Loaded \"{}\".", snapshot.save_name)))
        })
    }

    /// A player's saves, newest first.
    pub fn list_saves(&self, player_id: &str) -> Result<Vec<SavedSnapshot>, EngineError> {
        Ok(self.snapshots.list_for_player(player_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::TestGame;
    use crate::engine::InventoryAction;
    use chrono::Duration;

    #[test]
    fn test_save_and_load_round_trip() {
        let game = TestGame::new();
        let id = game.start_mystery();
        game.engine.pick_up(id, "brass_key").unwrap();
        game.engine.solve(id, "observation_puzzle", "3").unwrap();
        let saved_state = game.session(id);

        let snapshot = game.engine.save(id, "after candles").unwrap();
        assert_eq!(snapshot.session_id, id);
        assert_eq!(snapshot.player_id, "player-1");

        game.clock.advance(Duration::minutes(5));
        game.engine.move_player(id, "north").unwrap();
        game.engine.update_inventory(id, "brass_key", InventoryAction::Remove).unwrap();

        let loaded = game.engine.load(snapshot.id).unwrap();
        assert!(loaded.success);

        let restored = loaded.session;
        assert_eq!(restored.id, saved_state.id);
        assert_eq!(restored.player_id, saved_state.player_id);
        assert_eq!(restored.created_at, saved_state.created_at);
        assert_eq!(restored.current_room, "ancient_library");
        assert_eq!(restored.inventory, saved_state.inventory);
        assert_eq!(restored.history, saved_state.history);
        assert_eq!(restored.puzzle_state, saved_state.puzzle_state);
        assert_eq!(restored.narrative_state, saved_state.narrative_state);
        assert_eq!(restored.current_room_description, saved_state.current_room_description);
        assert_eq!(game.session(id), restored);
    }

    #[test]
    fn test_saves_are_not_deduplicated() {
        let game = TestGame::new();
        let id = game.start_mystery();

        game.engine.save(id, "slot").unwrap();
        game.clock.advance(Duration::seconds(1));
        game.engine.save(id, "slot").unwrap();
        game.clock.advance(Duration::seconds(1));
        let latest = game.engine.save(id, "  ").unwrap();

        let saves = game.engine.list_saves("player-1").unwrap();
        assert_eq!(saves.len(), 3);
        assert_eq!(saves[0].id, latest.id);
        assert_eq!(saves[0].save_name, "Saved game");
        assert!(game.engine.list_saves("someone-else").unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_snapshot() {
        let game = TestGame::new();
        let missing = SnapshotId::new();
        assert!(matches!(
            game.engine.load(missing),
            Err(EngineError::SnapshotNotFound(id)) if id == missing
        ));
    }

    #[test]
    fn test_load_never_recreates_deleted_session() {
        let game = TestGame::new();
        let id = game.start_mystery();
        let snapshot = game.engine.save(id, "slot").unwrap();
        game.engine.delete(id).unwrap();

        assert!(matches!(
            game.engine.load(snapshot.id),
            Err(EngineError::SessionNotFound(_))
        ));
    }
}
