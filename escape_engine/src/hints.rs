//! Hint budget and cooldown policy.

use chrono::{DateTime, Duration, Utc};
use escape_rules::{PuzzleDefinition, Room, SessionState};

/// Why a hint was or was not granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintOutcome {
    Granted { puzzle_id: String, text: String },
    Exhausted,
    CoolingDown { wait_secs: i64 },
    NothingToHint,
}

impl HintOutcome {
    pub fn message(&self) -> String {
        match self {
            HintOutcome::Granted { text, .. } => text.clone(),
            HintOutcome::Exhausted => "You have no more hints.".to_string(),
            HintOutcome::CoolingDown { wait_secs } => format!(
                "Please wait {} more seconds before asking for another hint.",
                wait_secs
            ),
            HintOutcome::NothingToHint => "There is nothing left to solve in this room.".to_string(),
        }
    }
}

/// Grants hints against the session's budget.
#[derive(Debug, Clone, Copy)]
pub struct HintManager {
    cooldown: Duration,
}

impl HintManager {
    pub fn new(cooldown_secs: i64) -> Self {
        Self {
            cooldown: Duration::seconds(cooldown_secs.max(0)),
        }
    }

    /// Try to grant a hint for the first unsolved puzzle of `room`.
    ///
    /// Gates are checked in order (budget, cooldown, target); the session is
    /// only modified when a hint is granted.
    pub fn request(&self, session: &mut SessionState, room: &Room, now: DateTime<Utc>) -> HintOutcome {
        if session.hints_remaining() == 0 {
            return HintOutcome::Exhausted;
        }

        if let Some(last) = session.last_hint_at() {
            let remaining = (last + self.cooldown) - now;
            if remaining > Duration::zero() {
                let wait_secs = (remaining.num_milliseconds() + 999) / 1000;
                return HintOutcome::CoolingDown { wait_secs };
            }
        }

        let Some(puzzle) = room.puzzles.iter().find(|p| !session.is_solved(&p.id)) else {
            return HintOutcome::NothingToHint;
        };

        session.set_hints_remaining(session.hints_remaining() - 1);
        session.set_last_hint_at(now);
        let progress = session.progress_mut(&puzzle.id);
        progress.hints_used += 1;
        let level = progress.hints_used;

        HintOutcome::Granted {
            puzzle_id: puzzle.id.clone(),
            text: hint_text(puzzle, level),
        }
    }
}

impl Default for HintManager {
    fn default() -> Self {
        Self::new(15)
    }
}

/// Hint for the `level`-th request (1-based), clamped to the last hint.
fn hint_text(puzzle: &PuzzleDefinition, level: u32) -> String {
    let index = (level.max(1) - 1) as usize;
    match puzzle.hints.get(index).or_else(|| puzzle.hints.last()) {
        Some(hint) => hint.clone(),
        None => format!("Think carefully about the {}: {}", puzzle.name, puzzle.description),
    }
}
