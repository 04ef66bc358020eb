//! Puzzle attempts, item use and hints.

use escape_rules::{display_name, SessionId, SessionState, Theme};

use super::{ActionOutcome, GameEngine, Step};
use crate::error::EngineError;
use crate::hints::HintOutcome;
use crate::resolution::{current_room, PuzzleResolver, Resolution};

impl GameEngine {
    /// Attempt a puzzle of the current room.
    pub fn solve(&self, session_id: SessionId, puzzle_id: &str, attempt: &str) -> Result<ActionOutcome, EngineError> {
        self.act(session_id, |theme, session, now| {
            let resolution = PuzzleResolver::new(&self.config, &self.normalizer)
                .resolve(session, theme, puzzle_id, attempt, None, now)?;
            self.finish_resolution(theme, session, resolution)
        })
    }

    /// Use an inventory item, optionally on a specific puzzle of the current room.
    ///
    /// Without a target the item is tried on the first unsolved puzzle that
    /// requires it, or else the first unsolved puzzle.
    pub fn use_item(
        &self,
        session_id: SessionId,
        item_id: &str,
        target_puzzle_id: Option<&str>,
    ) -> Result<ActionOutcome, EngineError> {
        self.act(session_id, |theme, session, now| {
            let item_name = display_name(item_id);
            if !session.has_item(item_id) {
                return Ok(Step::refused(format!("You don't have {}.", item_name)));
            }

            let room = current_room(theme, session)?;
            let puzzle = match target_puzzle_id {
                Some(target) => match room.puzzle(target) {
                    Some(puzzle) => puzzle,
                    None => {
                        return Ok(Step::refused(format!(
                            "There is no {} here to use the {} on.",
                            display_name(target),
                            item_name
                        )))
                    }
                },
                None => {
                    let unsolved: Vec<_> = room
                        .puzzles
                        .iter()
                        .filter(|p| !session.is_solved(&p.id))
                        .collect();
                    match unsolved
                        .iter()
                        .find(|p| p.requires_item(item_id))
                        .or(unsolved.first())
                        .copied()
                    {
                        Some(puzzle) => puzzle,
                        None => {
                            return Ok(Step::refused(format!(
                                "There is nothing here to use the {} on.",
                                item_name
                            )))
                        }
                    }
                }
            };

            let attempt = format!("use {} on {}", item_id, puzzle.id);
            let resolution = PuzzleResolver::new(&self.config, &self.normalizer)
                .with_mismatch_message(format!(
                    "Using the {} on the {} doesn't work.",
                    item_name, puzzle.name
                ))
                .resolve(session, theme, &puzzle.id, &attempt, Some(item_id), now)?;
            self.finish_resolution(theme, session, resolution)
        })
    }

    /// Ask for a hint about the current room.
    pub fn hint(&self, session_id: SessionId) -> Result<ActionOutcome, EngineError> {
        self.act(session_id, |theme, session, now| {
            let room = current_room(theme, session)?;
            let outcome = self.hints.request(session, room, now);
            let message = outcome.message();

            Ok(match outcome {
                HintOutcome::Granted { puzzle_id, .. } => {
                    tracing::info!(
                        session_id = %session.id,
                        puzzle_id = %puzzle_id,
                        hints_remaining = session.hints_remaining(),
                        "Hint granted"
                    );
                    Step::done(message)
                }
                HintOutcome::CoolingDown { wait_secs } => {
                    tracing::debug!(session_id = %session.id, wait_secs, "Hint on cooldown");
                    Step::refused(message)
                }
                HintOutcome::Exhausted | HintOutcome::NothingToHint => Step::refused(message),
            })
        })
    }

    /// Turn a resolution into a step, finishing any door transition.
    fn finish_resolution(
        &self,
        theme: &Theme,
        session: &mut SessionState,
        mut resolution: Resolution,
    ) -> Result<Step, EngineError> {
        let mut escaped = false;
        if resolution.evaluation.moved_to.is_some() {
            escaped = self.arrive(theme, session)?;
            if escaped {
                resolution.evaluation.game_over = true;
            }
        }

        let game_over = resolution.evaluation.game_over;
        let mut step = Step {
            success: resolution.solved,
            message: resolution.message,
            evaluation: Some(resolution.evaluation),
            game_over,
            changed: resolution.changed,
        };
        if escaped {
            step.message.push(' ');
            step.message.push_str(&self.config.win_message);
        }
        Ok(step)
    }
}
