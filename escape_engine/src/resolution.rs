//! Puzzle resolution: decide an attempt and apply its consequences.

use chrono::{DateTime, Utc};
use escape_rules::{
    display_name, slug, Evaluation, Prerequisite, PuzzleDefinition, PuzzleStatus, Room,
    SessionState, Solution, Theme,
};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::intent::{matches_solution, split_use_on, NormalizedAttempt, Normalizer};

/// Progress extension field counting the leading steps entered correctly.
pub const STEPS_MATCHED: &str = "steps_matched";

/// Result of resolving one attempt.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub solved: bool,
    pub message: String,
    pub evaluation: Evaluation,
    /// Whether the session was modified and needs to be written back.
    pub changed: bool,
}

impl Resolution {
    fn unchanged(solved: bool, message: String, evaluation: Evaluation) -> Self {
        Self {
            solved,
            message,
            evaluation,
            changed: false,
        }
    }
}

/// Applies the ordered resolution gates to a session.
pub struct PuzzleResolver<'a> {
    config: &'a EngineConfig,
    normalizer: &'a Normalizer,
    mismatch_message: Option<String>,
}

impl<'a> PuzzleResolver<'a> {
    pub fn new(config: &'a EngineConfig, normalizer: &'a Normalizer) -> Self {
        Self {
            config,
            normalizer,
            mismatch_message: None,
        }
    }

    /// Message reported and recorded for a wrong attempt instead of the generic one.
    pub fn with_mismatch_message(mut self, message: impl Into<String>) -> Self {
        self.mismatch_message = Some(message.into());
        self
    }

    /// Resolve `attempt` against a puzzle of the current room.
    ///
    /// `used_item` is the inventory item the attempt was made with, if any;
    /// it is consumed when the attempt succeeds.
    pub fn resolve(
        &self,
        session: &mut SessionState,
        theme: &Theme,
        puzzle_id: &str,
        attempt: &str,
        used_item: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Resolution, EngineError> {
        let room = current_room(theme, session)?;
        let puzzle = room.puzzle(puzzle_id).ok_or_else(|| {
            EngineError::configuration(format!(
                "Puzzle {} not found in current room {}",
                puzzle_id, room.id
            ))
        })?;
        let door_target = door_target(theme, room, puzzle)?;

        let mut evaluation = Evaluation::new(puzzle_id, attempt);

        if session.is_solved(puzzle_id) {
            evaluation.is_correct = true;
            evaluation.status = PuzzleStatus::AlreadySolved;
            return Ok(Resolution::unchanged(
                true,
                "This puzzle is already solved.".to_string(),
                evaluation,
            ));
        }

        let token = match self.normalizer.normalize(attempt) {
            NormalizedAttempt::Inspect => {
                evaluation.status = PuzzleStatus::Inspected;
                let text = inspection_text(session, puzzle);
                evaluation.feedback = text.clone();
                return Ok(Resolution::unchanged(false, text, evaluation));
            }
            NormalizedAttempt::Action(token) => token,
        };
        evaluation.normalized = token.clone();

        if let Some(missing) = first_unmet(session, puzzle) {
            tracing::debug!(
                session_id = %session.id,
                puzzle_id = %puzzle_id,
                missing = %missing,
                "Puzzle attempt blocked"
            );
            evaluation.status = PuzzleStatus::Blocked;
            let message = format!("You need {} before you can attempt this.", missing);
            evaluation.feedback = message.clone();
            return Ok(Resolution::unchanged(false, message, evaluation));
        }

        let correct = matches_solution(&token, &puzzle.solution.flattened());
        evaluation.is_correct = correct;

        let message = if correct {
            self.apply_success(session, theme, room, puzzle, door_target, attempt, used_item, &mut evaluation)
        } else {
            tracing::debug!(
                session_id = %session.id,
                puzzle_id = %puzzle_id,
                normalized = %token,
                "Incorrect attempt"
            );
            evaluation.status = PuzzleStatus::Unsolved;
            self.mismatch_message
                .clone()
                .unwrap_or_else(|| "Incorrect solution.".to_string())
        };
        evaluation.feedback = message.clone();

        let progress = session.progress_mut(puzzle_id);
        progress.record_attempt(evaluation.clone(), now);
        if let Solution::Steps(steps) = &puzzle.solution {
            let matched = if correct {
                steps.len()
            } else {
                steps_matched(&token, steps)
            };
            progress.next_step = (!correct && matched > 0).then(|| {
                format!("Continue {}: step {} of {}", puzzle.name, matched + 1, steps.len())
            });
            progress.merge_extra([(STEPS_MATCHED.to_string(), serde_json::Value::from(matched))]);
        }

        Ok(Resolution {
            solved: correct,
            message,
            evaluation,
            changed: true,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_success(
        &self,
        session: &mut SessionState,
        theme: &Theme,
        room: &Room,
        puzzle: &PuzzleDefinition,
        door_target: Option<&Room>,
        attempt: &str,
        used_item: Option<&str>,
        evaluation: &mut Evaluation,
    ) -> String {
        evaluation.status = PuzzleStatus::Solved;
        session.progress_mut(&puzzle.id).solved = true;

        for flag in &puzzle.outcomes {
            session.set_flag(flag.clone());
            evaluation.flags_set.push(flag.clone());
        }
        for item in &puzzle.reveal_on_solve {
            if session.add_item(item.clone()) {
                evaluation.items_found.push(item.clone());
            }
        }

        let used = used_item
            .map(str::to_string)
            .or_else(|| item_named_in(attempt).filter(|item| session.has_item(item)));
        if let Some(item) = used {
            if !puzzle.reveal_on_solve.contains(&item) && session.remove_item(&item) {
                evaluation.items_consumed.push(item);
            }
        }

        let mut message = "Puzzle solved!".to_string();
        if !evaluation.items_found.is_empty() {
            let names: Vec<String> = evaluation.items_found.iter().map(|i| display_name(i)).collect();
            message.push_str(&format!(" You found: {}.", names.join(", ")));
        }

        if let Some(next) = door_target {
            session.enter_room(next.id.clone());
            evaluation.moved_to = Some(next.id.clone());
            message.push_str(&format!(" The way to the {} is open.", next.name));
        }

        if room.puzzles.iter().all(|p| session.is_solved(&p.id)) {
            evaluation.room_completed = true;
            if theme.is_terminal(&room.id) && session.mark_escaped() {
                evaluation.game_over = true;
                message.push(' ');
                message.push_str(&self.config.win_message);
            }
        }

        tracing::info!(
            session_id = %session.id,
            puzzle_id = %puzzle.id,
            room_completed = evaluation.room_completed,
            "Puzzle solved"
        );
        message
    }
}

/// The session's current room, which must exist in its theme.
pub(crate) fn current_room<'t>(theme: &'t Theme, session: &SessionState) -> Result<&'t Room, EngineError> {
    theme.room(&session.current_room).ok_or_else(|| {
        EngineError::configuration(format!(
            "Room {} not found in theme {}",
            session.current_room, theme.id
        ))
    })
}

/// Text shown when a puzzle is inspected.
pub(crate) fn inspection_text(session: &SessionState, puzzle: &PuzzleDefinition) -> String {
    session
        .progress(&puzzle.id)
        .and_then(|p| p.next_step.clone())
        .filter(|step| !step.trim().is_empty())
        .unwrap_or_else(|| {
            if puzzle.description.trim().is_empty() {
                puzzle.name.clone()
            } else {
                puzzle.description.clone()
            }
        })
}

/// First unmet prerequisite or required item, as shown to the player.
pub(crate) fn first_unmet(session: &SessionState, puzzle: &PuzzleDefinition) -> Option<String> {
    let unmet_prerequisite = puzzle.requirements().find(|req| match req {
        Prerequisite::Item(item) => !session.has_item(item),
        Prerequisite::Flag(flag) => !session.flag_is_set(flag),
    });
    if let Some(req) = unmet_prerequisite {
        return Some(req.subject().to_string());
    }
    puzzle
        .items_required
        .iter()
        .find(|item| !session.has_item(item))
        .cloned()
}

/// Room a door puzzle opens onto, checked before anything is mutated.
fn door_target<'t>(
    theme: &'t Theme,
    room: &Room,
    puzzle: &PuzzleDefinition,
) -> Result<Option<&'t Room>, EngineError> {
    if !puzzle.door {
        return Ok(None);
    }
    match &room.next_room_id {
        None => Ok(None),
        Some(next) => theme.room(next).map(Some).ok_or_else(|| {
            EngineError::configuration(format!(
                "Next room {} of {} not found in theme {}",
                next, room.id, theme.id
            ))
        }),
    }
}

/// Leading steps of a multi-step answer that `token` spells out, short of the whole answer.
fn steps_matched(token: &str, steps: &[String]) -> usize {
    (1..steps.len())
        .rev()
        .find(|&count| matches_solution(token, &steps[..count].concat()))
        .unwrap_or(0)
}

/// Item id named by a `use X on Y` attempt.
fn item_named_in(attempt: &str) -> Option<String> {
    let cleaned = attempt.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    split_use_on(&cleaned).map(|(item, _)| slug(item))
}
