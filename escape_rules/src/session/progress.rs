//! Per-puzzle progress records and evaluation payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a puzzle stands after an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PuzzleStatus {
    #[default]
    Unsolved,
    Solved,
    AlreadySolved,
    /// The attempt was an inspection; nothing was evaluated.
    Inspected,
    /// A prerequisite or required item was missing.
    Blocked,
}

/// Full outcome of evaluating one attempt, kept for audit and hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Evaluation {
    pub puzzle_id: String,
    /// Attempt text exactly as received.
    pub attempt: String,
    /// Canonical action token the attempt normalized to.
    pub normalized: String,
    pub is_correct: bool,
    pub status: PuzzleStatus,
    pub feedback: String,
    /// Narrative flags set by this evaluation.
    #[serde(default)]
    pub flags_set: Vec<String>,
    #[serde(default)]
    pub items_found: Vec<String>,
    #[serde(default)]
    pub items_consumed: Vec<String>,
    /// Room entered through a door puzzle.
    #[serde(default)]
    pub moved_to: Option<String>,
    #[serde(default)]
    pub room_completed: bool,
    #[serde(default)]
    pub game_over: bool,
}

impl Evaluation {
    /// Start an evaluation for an attempt on a puzzle.
    pub fn new(puzzle_id: impl Into<String>, attempt: impl Into<String>) -> Self {
        Self {
            puzzle_id: puzzle_id.into(),
            attempt: attempt.into(),
            ..Default::default()
        }
    }
}

/// Progress of one puzzle within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PuzzleProgress {
    pub solved: bool,
    pub attempts: u32,
    #[serde(default)]
    pub last_attempt: Option<String>,
    #[serde(default)]
    pub last_attempt_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub hints_used: u32,
    /// Text describing the next step of a partially worked puzzle.
    #[serde(default)]
    pub next_step: Option<String>,
    #[serde(default)]
    pub last_evaluation: Option<Evaluation>,

    /// Open extension fields.
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PuzzleProgress {
    /// Count an attempt and keep its evaluation.
    pub fn record_attempt(&mut self, evaluation: Evaluation, at: DateTime<Utc>) {
        self.attempts += 1;
        self.last_attempt = Some(evaluation.attempt.clone());
        self.last_attempt_at = Some(at);
        self.last_evaluation = Some(evaluation);
    }

    /// Merge extension fields; incoming keys overwrite existing ones.
    pub fn merge_extra(&mut self, fields: impl IntoIterator<Item = (String, serde_json::Value)>) {
        self.extra.extend(fields);
    }
}
