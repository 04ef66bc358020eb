//! Interactable objects and the effects of their actions.

use serde::{Deserialize, Serialize};

/// A non-puzzle object in a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interactable {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub actions: Vec<InteractableAction>,
}

impl Interactable {
    /// Find an action by label, ignoring case.
    pub fn action(&self, label: &str) -> Option<&InteractableAction> {
        self.actions
            .iter()
            .find(|a| a.label.eq_ignore_ascii_case(label.trim()))
    }
}

/// A labeled action offered by an interactable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractableAction {
    pub label: String,
    pub effect: Effect,
}

/// What happens when an interactable action is taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Replace a piece of narrative text, usually the room description.
    NarrativeUpdate {
        target: String,
        value: String,
        message: String,
    },

    /// Point the player at a puzzle in the same room.
    TriggerPuzzle { puzzle_id: String, message: String },

    /// Direct room change. Superseded by exits and door puzzles; kept so
    /// old content still loads, but never executed.
    NewRoom {
        room_id: String,
        #[serde(default)]
        message: Option<String>,
    },
}

impl Effect {
    /// Target name that rewrites the current room description.
    pub const ROOM_DESCRIPTION_TARGET: &'static str = "current_room_description";

    /// Whether this effect moves the player.
    pub fn is_movement(&self) -> bool {
        matches!(self, Effect::NewRoom { .. })
    }

    /// Puzzle referenced by this effect, if any.
    pub fn puzzle_id(&self) -> Option<&str> {
        match self {
            Effect::TriggerPuzzle { puzzle_id, .. } => Some(puzzle_id),
            _ => None,
        }
    }
}
