//! Session state: everything that changes during one player's run.

mod progress;
mod snapshot;

pub use progress::*;
pub use snapshot::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::world::room_items_key;

/// Unique identifier for sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Placeholder for sessions that have not been stored yet.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value stored under a narrative-state key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NarrativeValue {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<String>),
}

impl NarrativeValue {
    /// Truthiness used by prerequisite checks.
    pub fn is_truthy(&self) -> bool {
        match self {
            NarrativeValue::Bool(b) => *b,
            NarrativeValue::Int(i) => *i != 0,
            NarrativeValue::Text(s) => !s.is_empty(),
            NarrativeValue::List(items) => !items.is_empty(),
        }
    }
}

/// Reserved narrative-state keys.
pub mod keys {
    pub const INTRO_STORY: &str = "intro_story";
    pub const HINTS_REMAINING: &str = "hints_remaining";
    pub const LAST_HINT_AT: &str = "last_hint_at";
    /// Set once the player has escaped.
    pub const ESCAPED: &str = "game_over";
}

/// One player's run through a theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub id: SessionId,
    pub player_id: String,
    pub theme: String,
    /// Scenario / location label chosen at setup.
    pub location: String,
    pub difficulty: String,

    pub current_room: String,
    /// May diverge from the static text once narrative is generated.
    pub current_room_description: String,

    /// Previously visited rooms, most recent last.
    #[serde(default)]
    pub history: Vec<String>,

    /// Held items; membership matters, order is kept for display.
    #[serde(default)]
    pub inventory: Vec<String>,

    #[serde(default)]
    pub narrative_state: BTreeMap<String, NarrativeValue>,

    #[serde(default)]
    pub puzzle_state: BTreeMap<String, PuzzleProgress>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    /// Create a fresh, unsaved session positioned in `start_room`.
    pub fn new(
        player_id: impl Into<String>,
        theme: impl Into<String>,
        start_room: impl Into<String>,
        difficulty: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let start_room = start_room.into();
        Self {
            id: SessionId::nil(),
            player_id: player_id.into(),
            theme: theme.into(),
            location: start_room.clone(),
            difficulty: difficulty.into(),
            current_room: start_room,
            current_room_description: String::new(),
            history: Vec::new(),
            inventory: Vec::new(),
            narrative_state: BTreeMap::new(),
            puzzle_state: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if an item is held.
    pub fn has_item(&self, item_id: &str) -> bool {
        self.inventory.iter().any(|i| i == item_id)
    }

    /// Add an item. Returns false if it was already held.
    pub fn add_item(&mut self, item_id: impl Into<String>) -> bool {
        let item_id = item_id.into();
        if self.has_item(&item_id) {
            return false;
        }
        self.inventory.push(item_id);
        true
    }

    /// Remove an item. Returns false if it was not held.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        match self.inventory.iter().position(|i| i == item_id) {
            Some(index) => {
                self.inventory.remove(index);
                true
            }
            None => false,
        }
    }

    /// Check if a narrative flag is truthy.
    pub fn flag_is_set(&self, flag: &str) -> bool {
        self.narrative_state
            .get(flag)
            .map(NarrativeValue::is_truthy)
            .unwrap_or(false)
    }

    /// Set a narrative flag to true.
    pub fn set_flag(&mut self, flag: impl Into<String>) {
        self.narrative_state
            .insert(flag.into(), NarrativeValue::Bool(true));
    }

    pub fn set_narrative(&mut self, key: impl Into<String>, value: NarrativeValue) {
        self.narrative_state.insert(key.into(), value);
    }

    /// Progress record of a puzzle, if it has been touched.
    pub fn progress(&self, puzzle_id: &str) -> Option<&PuzzleProgress> {
        self.puzzle_state.get(puzzle_id)
    }

    /// Progress record of a puzzle, created on first use.
    pub fn progress_mut(&mut self, puzzle_id: &str) -> &mut PuzzleProgress {
        self.puzzle_state.entry(puzzle_id.to_string()).or_default()
    }

    pub fn is_solved(&self, puzzle_id: &str) -> bool {
        self.progress(puzzle_id).map(|p| p.solved).unwrap_or(false)
    }

    /// Remaining hint budget.
    pub fn hints_remaining(&self) -> u32 {
        match self.narrative_state.get(keys::HINTS_REMAINING) {
            Some(NarrativeValue::Int(n)) => u32::try_from(*n).unwrap_or(0),
            _ => 0,
        }
    }

    pub fn set_hints_remaining(&mut self, remaining: u32) {
        self.set_narrative(keys::HINTS_REMAINING, NarrativeValue::Int(i64::from(remaining)));
    }

    /// When the last hint was granted.
    pub fn last_hint_at(&self) -> Option<DateTime<Utc>> {
        match self.narrative_state.get(keys::LAST_HINT_AT) {
            Some(NarrativeValue::Text(stamp)) => DateTime::parse_from_rfc3339(stamp)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            _ => None,
        }
    }

    pub fn set_last_hint_at(&mut self, at: DateTime<Utc>) {
        self.set_narrative(keys::LAST_HINT_AT, NarrativeValue::Text(at.to_rfc3339()));
    }

    /// Items currently lying in a room, if the room's list has been seeded.
    pub fn room_items(&self, room_id: &str) -> Option<&[String]> {
        match self.narrative_state.get(&room_items_key(room_id)) {
            Some(NarrativeValue::List(items)) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn set_room_items(&mut self, room_id: &str, items: Vec<String>) {
        self.set_narrative(room_items_key(room_id), NarrativeValue::List(items));
    }

    /// Whether the player has already escaped.
    pub fn has_escaped(&self) -> bool {
        self.flag_is_set(keys::ESCAPED)
    }

    /// Mark the escape. Returns true only the first time.
    pub fn mark_escaped(&mut self) -> bool {
        if self.has_escaped() {
            return false;
        }
        self.set_flag(keys::ESCAPED);
        true
    }

    /// Move forward into a room, remembering where the player came from.
    pub fn enter_room(&mut self, room_id: impl Into<String>) {
        let previous = std::mem::replace(&mut self.current_room, room_id.into());
        self.history.push(previous);
    }

    /// Step back to the previous room. Returns the room left behind.
    pub fn step_back(&mut self) -> Option<String> {
        let previous = self.history.pop()?;
        Some(std::mem::replace(&mut self.current_room, previous))
    }

    /// Bump the update timestamp.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_session() -> SessionState {
        SessionState::new("player", "mystery", "ancient_library", "medium", Utc::now())
    }

    #[test]
    fn test_new_session() {
        let session = test_session();
        assert!(session.id.is_nil());
        assert_eq!(session.current_room, "ancient_library");
        assert_eq!(session.location, "ancient_library");
        assert!(session.inventory.is_empty());
        assert!(session.history.is_empty());
        assert_eq!(session.created_at, session.updated_at);
    }

    #[test]
    fn test_inventory_is_a_set() {
        let mut session = test_session();
        assert!(session.add_item("old_key"));
        assert!(!session.add_item("old_key"));
        assert!(session.add_item("lantern"));
        assert_eq!(session.inventory, vec!["old_key", "lantern"]);

        assert!(session.remove_item("old_key"));
        assert!(!session.remove_item("old_key"));
        assert!(!session.has_item("old_key"));
    }

    #[test]
    fn test_flag_truthiness() {
        let mut session = test_session();
        session.set_flag("door_open");
        session.set_narrative("count", NarrativeValue::Int(0));
        session.set_narrative("note", NarrativeValue::Text("found".into()));
        session.set_narrative("empty", NarrativeValue::List(vec![]));

        assert!(session.flag_is_set("door_open"));
        assert!(!session.flag_is_set("count"));
        assert!(session.flag_is_set("note"));
        assert!(!session.flag_is_set("empty"));
        assert!(!session.flag_is_set("missing"));
    }

    #[test]
    fn test_hint_bookkeeping() {
        let mut session = test_session();
        assert_eq!(session.hints_remaining(), 0);
        assert!(session.last_hint_at().is_none());

        session.set_hints_remaining(5);
        let at = Utc::now();
        session.set_last_hint_at(at);

        assert_eq!(session.hints_remaining(), 5);
        assert_eq!(session.last_hint_at().map(|t| t.timestamp()), Some(at.timestamp()));
    }

    #[test]
    fn test_history_stack() {
        let mut session = test_session();
        session.enter_room("mysterious_observatory");
        session.enter_room("escape_chamber");
        assert_eq!(session.history, vec!["ancient_library", "mysterious_observatory"]);

        assert_eq!(session.step_back().as_deref(), Some("escape_chamber"));
        assert_eq!(session.current_room, "mysterious_observatory");
        session.step_back();
        assert_eq!(session.current_room, "ancient_library");
        assert!(session.step_back().is_none());
        assert_eq!(session.current_room, "ancient_library");
    }

    #[test]
    fn test_escape_marked_once() {
        let mut session = test_session();
        assert!(session.mark_escaped());
        assert!(!session.mark_escaped());
        assert!(session.has_escaped());
    }

    #[test]
    fn test_room_items() {
        let mut session = test_session();
        assert!(session.room_items("ancient_library").is_none());
        session.set_room_items("ancient_library", vec!["brass_key".into()]);
        assert_eq!(
            session.room_items("ancient_library"),
            Some(&["brass_key".to_string()][..])
        );
        assert!(session.narrative_state.contains_key("room_ancient_library_items"));
    }

    #[test]
    fn test_session_json_roundtrip_keeps_value_kinds() {
        let mut session = test_session();
        session.set_hints_remaining(3);
        session.set_flag("library_clue_found");
        session.set_room_items("ancient_library", vec![]);

        let json = serde_json::to_value(&session).unwrap();
        let restored: SessionState = serde_json::from_value(json).unwrap();
        assert_eq!(restored, session);
    }
}
