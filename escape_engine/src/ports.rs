//! Collaborator contracts. Everything behind these traits is replaceable.

use chrono::{DateTime, Utc};
use escape_rules::{NarrativeValue, Room, SavedSnapshot, SessionId, SessionState, SnapshotId, Theme};
use std::collections::BTreeMap;

use crate::error::{DescriptionError, StoreError};

/// Durable keyed storage for sessions.
pub trait SessionStore: Send + Sync {
    fn get(&self, id: SessionId) -> Result<Option<SessionState>, StoreError>;

    /// Overwrite the record stored under `session.id`.
    fn put(&self, session: SessionState) -> Result<(), StoreError>;

    /// Store a new record and assign its id.
    fn create(&self, session: SessionState) -> Result<SessionId, StoreError>;

    fn delete(&self, id: SessionId) -> Result<bool, StoreError>;
}

/// Storage for saved snapshots.
pub trait SnapshotStore: Send + Sync {
    fn insert(&self, snapshot: SavedSnapshot) -> Result<(), StoreError>;

    fn get(&self, id: SnapshotId) -> Result<Option<SavedSnapshot>, StoreError>;

    /// A player's snapshots, newest first.
    fn list_for_player(&self, player_id: &str) -> Result<Vec<SavedSnapshot>, StoreError>;
}

/// Everything a description generator may look at.
#[derive(Debug, Clone, Copy)]
pub struct DescriptionRequest<'a> {
    pub theme: &'a Theme,
    /// Scenario / location label of the session.
    pub scenario: &'a str,
    pub narrative_state: &'a BTreeMap<String, NarrativeValue>,
    pub room: &'a Room,
}

/// Produces room descriptions. Callers must treat every call as fallible.
pub trait DescriptionGenerator: Send + Sync {
    fn describe(&self, request: &DescriptionRequest<'_>) -> Result<String, DescriptionError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
