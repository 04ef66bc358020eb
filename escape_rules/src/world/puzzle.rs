//! Puzzle definitions.

use serde::{Deserialize, Serialize};

/// Canonical answer to a puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Solution {
    Single(String),
    /// Ordered multi-step answer.
    Steps(Vec<String>),
}

impl Solution {
    /// The answer as one comparable string.
    ///
    /// Step lists are concatenated, so a multi-step puzzle is matched as a
    /// single combined answer rather than step by step.
    pub fn flattened(&self) -> String {
        match self {
            Solution::Single(answer) => answer.clone(),
            Solution::Steps(steps) => steps.concat(),
        }
    }
}

impl Default for Solution {
    fn default() -> Self {
        Solution::Single(String::new())
    }
}

/// A gating condition parsed from a prerequisite token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Prerequisite {
    /// Token `item_<id>`: the item must be in the inventory.
    Item(String),
    /// Any other token: the narrative flag must be truthy.
    Flag(String),
}

impl Prerequisite {
    pub const ITEM_PREFIX: &'static str = "item_";

    /// Parse a raw prerequisite token.
    pub fn parse(token: &str) -> Self {
        match token.strip_prefix(Self::ITEM_PREFIX) {
            Some(item) if !item.is_empty() => Prerequisite::Item(item.to_string()),
            _ => Prerequisite::Flag(token.to_string()),
        }
    }

    /// Token form for an item requirement.
    pub fn item_token(item_id: &str) -> String {
        format!("{}{}", Self::ITEM_PREFIX, item_id)
    }

    /// The name shown to the player when this requirement is unmet.
    pub fn subject(&self) -> &str {
        match self {
            Prerequisite::Item(item) => item,
            Prerequisite::Flag(flag) => flag,
        }
    }
}

/// Static definition of a puzzle inside a room.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PuzzleDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub solution: Solution,

    /// Free-form puzzle category (e.g. "code_entry", "riddle").
    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub prerequisites: Vec<String>,

    /// Items that must be held when the puzzle is attempted.
    #[serde(default)]
    pub items_required: Vec<String>,

    /// Narrative flags set on success.
    #[serde(default)]
    pub outcomes: Vec<String>,

    /// Items granted on success.
    #[serde(default)]
    pub reveal_on_solve: Vec<String>,

    /// Hint texts, weakest first.
    #[serde(default)]
    pub hints: Vec<String>,

    #[serde(default)]
    pub triggers_event: Option<String>,

    /// Solving this puzzle moves the player to the room's next room.
    #[serde(default)]
    pub door: bool,
}

impl PuzzleDefinition {
    /// Create a single-answer puzzle.
    pub fn new(id: impl Into<String>, name: impl Into<String>, solution: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            solution: Solution::Single(solution.into()),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_prerequisite(mut self, token: impl Into<String>) -> Self {
        self.prerequisites.push(token.into());
        self
    }

    pub fn with_required_item(mut self, item_id: impl Into<String>) -> Self {
        self.items_required.push(item_id.into());
        self
    }

    pub fn with_outcome(mut self, flag: impl Into<String>) -> Self {
        self.outcomes.push(flag.into());
        self
    }

    pub fn with_reveal(mut self, item_id: impl Into<String>) -> Self {
        self.reveal_on_solve.push(item_id.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn as_door(mut self) -> Self {
        self.door = true;
        self
    }

    /// Parsed prerequisites in declaration order.
    pub fn requirements(&self) -> impl Iterator<Item = Prerequisite> + '_ {
        self.prerequisites.iter().map(|token| Prerequisite::parse(token))
    }

    /// Whether the puzzle explicitly requires holding `item_id`.
    pub fn requires_item(&self, item_id: &str) -> bool {
        self.items_required.iter().any(|i| i == item_id)
    }
}
