//! Saved snapshots of a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{SessionId, SessionState};

/// Unique identifier for saved snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotId(pub Uuid);

impl SnapshotId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SnapshotId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named, immutable point-in-time copy of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSnapshot {
    pub id: SnapshotId,
    pub player_id: String,
    pub session_id: SessionId,
    pub save_name: String,
    pub saved_at: DateTime<Utc>,
    /// Full JSON copy of the session at save time.
    pub game_state: serde_json::Value,
}

impl SavedSnapshot {
    /// Capture a session.
    pub fn capture(
        session: &SessionState,
        save_name: impl Into<String>,
        saved_at: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: SnapshotId::new(),
            player_id: session.player_id.clone(),
            session_id: session.id,
            save_name: save_name.into(),
            saved_at,
            game_state: serde_json::to_value(session)?,
        })
    }

    /// Decode the stored session copy.
    pub fn state(&self) -> Result<SessionState, serde_json::Error> {
        SessionState::deserialize(&self.game_state)
    }

    /// Overwrite `target` with the saved state, keeping its identity,
    /// owner and creation time.
    pub fn restore_onto(&self, target: &mut SessionState) -> Result<(), serde_json::Error> {
        let saved = self.state()?;
        let id = target.id;
        let player_id = std::mem::take(&mut target.player_id);
        let created_at = target.created_at;

        *target = SessionState {
            id,
            player_id,
            created_at,
            ..saved
        };
        Ok(())
    }
}
