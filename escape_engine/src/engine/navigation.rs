//! Movement, items and room interaction.

use escape_rules::{display_name, Effect, NarrativeValue, SessionId};
use serde::{Deserialize, Serialize};

use super::{ActionOutcome, GameEngine, Step};
use crate::error::EngineError;
use crate::options::{items_in_room, unlocked_next_room};
use crate::resolution::{current_room, inspection_text};

/// Direct inventory edits requested by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryAction {
    Add,
    Remove,
}

impl GameEngine {
    /// Walk through the exit labeled `direction`.
    pub fn move_player(&self, session_id: SessionId, direction: &str) -> Result<ActionOutcome, EngineError> {
        self.act(session_id, |theme, session, _| {
            let room = current_room(theme, session)?;
            let Some(target_id) = room.exit(direction) else {
                tracing::debug!(
                    session_id = %session.id,
                    room_id = %room.id,
                    direction = %direction,
                    "No exit in that direction"
                );
                return Ok(Step::refused(format!(
                    "Cannot move {} from {}.",
                    direction.trim(),
                    room.name
                )));
            };
            let target = theme.room(target_id).ok_or_else(|| {
                EngineError::configuration(format!(
                    "Exit {} of {} leads to unknown room {}",
                    direction, room.id, target_id
                ))
            })?;

            session.enter_room(target.id.clone());
            let escaped = self.arrive(theme, session)?;
            Ok(Step::done(format!("You move {} into the {}.", direction.trim().to_lowercase(), target.name))
                .escaped(escaped, &self.config.win_message))
        })
    }

    /// Return to the previously visited room.
    pub fn go_back(&self, session_id: SessionId) -> Result<ActionOutcome, EngineError> {
        self.act(session_id, |theme, session, _| {
            let Some(previous_id) = session.history.last() else {
                return Ok(Step::refused("There is nowhere to go back to."));
            };
            let previous = theme.room(previous_id).ok_or_else(|| {
                EngineError::configuration(format!(
                    "Room {} in history not found in theme {}",
                    previous_id, theme.id
                ))
            })?;

            session.step_back();
            let escaped = self.arrive(theme, session)?;
            Ok(Step::done(format!("You return to the {}.", previous.name))
                .escaped(escaped, &self.config.win_message))
        })
    }

    /// Continue to the next room in sequence once the main puzzle is solved.
    pub fn go_to_next_room(&self, session_id: SessionId) -> Result<ActionOutcome, EngineError> {
        self.act(session_id, |theme, session, _| {
            let room = current_room(theme, session)?;
            let Some(next) = unlocked_next_room(theme, session, room) else {
                let message = if room.next_room_id.is_none() {
                    "There is no way onward from here."
                } else {
                    "The way forward is still locked."
                };
                return Ok(Step::refused(message));
            };

            session.enter_room(next.id.clone());
            let escaped = self.arrive(theme, session)?;
            Ok(Step::done(format!("You proceed to the {}.", next.name))
                .escaped(escaped, &self.config.win_message))
        })
    }

    /// Take an item lying in the current room.
    pub fn pick_up(&self, session_id: SessionId, item_id: &str) -> Result<ActionOutcome, EngineError> {
        self.act(session_id, |theme, session, _| {
            let room = current_room(theme, session)?;
            let name = display_name(item_id);
            let mut lying = items_in_room(session, room).to_vec();

            let Some(index) = lying.iter().position(|i| i == item_id) else {
                let message = if session.has_item(item_id) {
                    format!("You already have the {}.", name)
                } else {
                    format!("There is no {} here.", name)
                };
                return Ok(Step::refused(message));
            };

            lying.remove(index);
            session.set_room_items(&room.id, lying);
            session.add_item(item_id);
            tracing::info!(session_id = %session.id, item_id = %item_id, "Item picked up");
            Ok(Step::done(format!("You picked up the {}.", name)))
        })
    }

    /// Add or remove an inventory item directly. Adding is idempotent.
    pub fn update_inventory(
        &self,
        session_id: SessionId,
        item_id: &str,
        action: InventoryAction,
    ) -> Result<ActionOutcome, EngineError> {
        self.act(session_id, |_, session, _| {
            let name = display_name(item_id);
            Ok(match action {
                InventoryAction::Add => {
                    let message = format!("Added {} to your inventory.", name);
                    if session.add_item(item_id) {
                        Step::done(message)
                    } else {
                        Step::info(message)
                    }
                }
                InventoryAction::Remove => {
                    if session.remove_item(item_id) {
                        Step::done(format!("Removed {} from your inventory.", name))
                    } else {
                        Step::refused(format!("You don't have {}.", name))
                    }
                }
            })
        })
    }

    /// Describe the surroundings again and list what stands out.
    pub fn look_around(&self, session_id: SessionId) -> Result<ActionOutcome, EngineError> {
        self.act(session_id, |theme, session, _| {
            let before = session.current_room_description.clone();
            self.refresh_description(theme, session)?;
            let room = current_room(theme, session)?;

            let mut notable: Vec<String> = room.interactables.iter().map(|i| i.name.clone()).collect();
            notable.extend(
                items_in_room(session, room)
                    .iter()
                    .filter(|item| !session.has_item(item))
                    .map(|item| display_name(item)),
            );

            let mut message = session.current_room_description.clone();
            if !notable.is_empty() {
                message.push_str(&format!(" You notice: {}.", notable.join(", ")));
            }

            let mut step = Step::info(message);
            step.changed = session.current_room_description != before;
            Ok(step)
        })
    }

    /// Take a labeled action on an interactable of the current room.
    pub fn interact(
        &self,
        session_id: SessionId,
        interactable_id: &str,
        label: &str,
    ) -> Result<ActionOutcome, EngineError> {
        self.act(session_id, |theme, session, _| {
            let room = current_room(theme, session)?;
            let Some(interactable) = room.interactable(interactable_id) else {
                return Ok(Step::refused("There is no such thing here."));
            };
            let Some(action) = interactable.action(label) else {
                return Ok(Step::refused(format!(
                    "You can't do that with the {}.",
                    interactable.name
                )));
            };

            match &action.effect {
                Effect::NarrativeUpdate {
                    target,
                    value,
                    message,
                } => {
                    if target == Effect::ROOM_DESCRIPTION_TARGET {
                        session.current_room_description = value.clone();
                    } else {
                        session.set_narrative(target.clone(), NarrativeValue::Text(value.clone()));
                    }
                    Ok(Step::done(format!("{} {}", message, value)))
                }
                Effect::TriggerPuzzle { puzzle_id, message } => {
                    let puzzle = room.puzzle(puzzle_id).ok_or_else(|| {
                        EngineError::configuration(format!(
                            "{} triggers unknown puzzle {}",
                            interactable.id, puzzle_id
                        ))
                    })?;
                    let detail = if session.is_solved(puzzle_id) {
                        "This puzzle is already solved.".to_string()
                    } else {
                        inspection_text(session, puzzle)
                    };
                    Ok(Step::info(format!("{} {}", message, detail)))
                }
                Effect::NewRoom { room_id, .. } => {
                    tracing::warn!(
                        session_id = %session.id,
                        interactable = %interactable.id,
                        room_id = %room_id,
                        "Refusing deprecated new_room effect"
                    );
                    Ok(Step::refused("Nothing happens."))
                }
            }
        })
    }
}
