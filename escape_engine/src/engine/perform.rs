//! Free-text player actions.

use escape_rules::{slug, Interactable, PuzzleDefinition, Room, SessionId, SessionState, Theme};

use super::{ActionOutcome, GameEngine, Step};
use crate::error::EngineError;
use crate::intent::{parse_command, Command};
use crate::options::unlocked_next_room;
use crate::resolution::{current_room, inspection_text};

impl GameEngine {
    /// Carry out a typed or clicked action.
    ///
    /// Interactable action labels are matched first; anything else goes
    /// through the intent parser.
    pub fn perform(&self, session_id: SessionId, text: &str) -> Result<ActionOutcome, EngineError> {
        let view = self.get_session(session_id)?;
        let theme = self.theme_of(&view.session)?;
        let room = current_room(theme, &view.session)?;
        let wanted = text.trim();

        for interactable in &room.interactables {
            if let Some(action) = interactable.action(wanted) {
                return self.interact(session_id, &interactable.id, &action.label);
            }
        }
        if let Some(puzzle) = room.puzzles.iter().find(|p| {
            view.session.progress(&p.id).and_then(|pr| pr.next_step.as_ref()).is_some()
                && inspection_text(&view.session, p).eq_ignore_ascii_case(wanted)
        }) {
            return self.solve(session_id, &puzzle.id, &self.config.inspect_keyword);
        }

        let command = parse_command(text);
        tracing::debug!(session_id = %session_id, command = ?command, "Parsed player action");

        match command {
            Command::LookAround => self.look_around(session_id),
            Command::GoBack => self.go_back(session_id),
            Command::Move(direction) => self.move_player(session_id, &direction),
            Command::GoToRoom(name) => self.go_to_named_room(&view.session, theme, room, &name),
            Command::PickUp(item) => self.pick_up(session_id, &slug(&item)),
            Command::UseItemOn { item, target } => {
                let item_id = slug(&item);
                match target {
                    None => self.use_item(session_id, &item_id, None),
                    Some(target) => self.use_item_on_named(session_id, room, &item_id, &target),
                }
            }
            Command::SolvePuzzle { puzzle, attempt } => match find_puzzle(room, &puzzle) {
                Some(found) => self.solve(session_id, &found.id, attempt.as_deref().unwrap_or("")),
                None => self.refuse(session_id, format!("There is no puzzle called {} here.", puzzle)),
            },
            Command::Inspect(thing) => {
                if let Some(puzzle) = find_puzzle(room, &thing) {
                    return self.solve(session_id, &puzzle.id, &self.config.inspect_keyword);
                }
                match find_interactable(room, &thing) {
                    Some(found) if !found.description.is_empty() => {
                        let description = found.description.clone();
                        self.act(session_id, move |_, _, _| Ok(Step::info(description)))
                    }
                    _ => self.refuse(session_id, format!("You don't see {} here.", thing)),
                }
            }
            Command::Unknown(text) => {
                tracing::debug!(session_id = %session_id, text = %text, "Unrecognized action");
                self.refuse(session_id, format!("I don't understand \"{}\".", text))
            }
        }
    }

    /// Walk to a named room: the next room once unlocked, else through a matching exit.
    fn go_to_named_room(
        &self,
        session: &SessionState,
        theme: &Theme,
        room: &Room,
        name: &str,
    ) -> Result<ActionOutcome, EngineError> {
        let session_id = session.id;
        let wanted = slug(name);
        let Some(target) = theme
            .rooms
            .iter()
            .find(|r| r.id == wanted || slug(&r.name) == wanted)
        else {
            return self.refuse(session_id, format!("You don't know a place called {}.", name));
        };

        let is_next = room.next_room_id.as_deref() == Some(target.id.as_str());
        if is_next && unlocked_next_room(theme, session, room).is_some() {
            return self.go_to_next_room(session_id);
        }
        match room.exits.iter().find(|(_, to)| **to == target.id) {
            Some((direction, _)) => self.move_player(session_id, direction),
            None if is_next => self.go_to_next_room(session_id),
            None => self.refuse(session_id, format!("You can't get to the {} from here.", target.name)),
        }
    }

    /// `use X on Y` where Y may be a puzzle or the interactable that triggers one.
    fn use_item_on_named(
        &self,
        session_id: SessionId,
        room: &Room,
        item_id: &str,
        target: &str,
    ) -> Result<ActionOutcome, EngineError> {
        if let Some(puzzle) = find_puzzle(room, target) {
            return self.use_item(session_id, item_id, Some(&puzzle.id));
        }
        if let Some(interactable) = find_interactable(room, target) {
            let triggered = interactable
                .actions
                .iter()
                .find_map(|a| a.effect.puzzle_id())
                .map(str::to_string);
            return match triggered {
                Some(puzzle_id) => self.use_item(session_id, item_id, Some(&puzzle_id)),
                None => self.refuse(
                    session_id,
                    format!("Nothing happens when you use that on the {}.", interactable.name),
                ),
            };
        }
        self.use_item(session_id, item_id, Some(&slug(target)))
    }

    fn refuse(&self, session_id: SessionId, message: String) -> Result<ActionOutcome, EngineError> {
        self.act(session_id, move |_, _, _| Ok(Step::refused(message)))
    }
}

/// Match a spoken name against puzzle ids and names.
fn find_puzzle<'r>(room: &'r Room, name: &str) -> Option<&'r PuzzleDefinition> {
    let wanted = slug(name);
    room.puzzles.iter().find(|p| {
        p.id == wanted || slug(&p.name) == wanted || p.id == format!("{}_puzzle", wanted)
    })
}

fn find_interactable<'r>(room: &'r Room, name: &str) -> Option<&'r Interactable> {
    let wanted = slug(name);
    room.interactables
        .iter()
        .find(|i| i.id == wanted || slug(&i.name) == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::TestGame;
    use crate::engine::InventoryAction;

    #[test]
    fn test_option_labels_round_trip_through_perform() {
        let game = TestGame::new();
        let id = game.start_mystery();

        let picked = game.engine.perform(id, "Pick up Brass Key").unwrap();
        assert!(picked.success);
        assert!(picked.session.has_item("brass_key"));

        let inspected = game.engine.perform(id, "Solve Candle Count").unwrap();
        assert!(inspected.message.contains("Count the lights"));
        assert!(!inspected.session.is_solved("observation_puzzle"));

        let solved = game.engine.perform(id, "solve candle count with 3").unwrap();
        assert!(solved.success);

        let forward = game.engine.perform(id, "Go to Mysterious Observatory").unwrap();
        assert!(forward.success);
        assert_eq!(forward.session.current_room, "mysterious_observatory");
    }

    #[test]
    fn test_go_to_room_uses_exit_while_sequence_locked() {
        let game = TestGame::new();
        let id = game.start_mystery();

        let outcome = game.engine.perform(id, "Go to Mysterious Observatory").unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.message, "You move north into the Mysterious Observatory.");
        assert_eq!(outcome.session.current_room, "mysterious_observatory");

        let nowhere = game.engine.perform(id, "Go to Sci-Fi Hangar Main").unwrap();
        assert!(!nowhere.success);
    }

    #[test]
    fn test_interactable_labels_take_priority() {
        let game = TestGame::new();
        let id = game.start_mystery();

        let outcome = game.engine.perform(id, "search shelves").unwrap();
        assert!(outcome.success);
        assert!(outcome.session.current_room_description.contains("atlases"));
    }

    #[test]
    fn test_movement_and_unknown_phrases() {
        let game = TestGame::new();
        let id = game.start_mystery();

        let wall = game.engine.perform(id, "go west").unwrap();
        assert!(!wall.success);
        assert_eq!(wall.message, "Cannot move west from Ancient Library.");

        let north = game.engine.perform(id, "north").unwrap();
        assert_eq!(north.session.current_room, "mysterious_observatory");

        let back = game.engine.perform(id, "go back").unwrap();
        assert_eq!(back.session.current_room, "ancient_library");

        let unknown = game.engine.perform(id, "dance wildly").unwrap();
        assert!(!unknown.success);
        assert_eq!(unknown.message, "I don't understand \"dance wildly\".");
    }

    #[test]
    fn test_use_item_on_interactable_targets_its_puzzle() {
        let game = TestGame::new();
        let id = game
            .engine
            .start("p", "forgotten_library", "forgotten_library_study", "medium")
            .unwrap()
            .session
            .id;
        game.engine
            .update_inventory(id, "old_key", InventoryAction::Add)
            .unwrap();
        game.engine.solve(id, "desk_puzzle", "7").unwrap();

        let cabinet = game.engine.perform(id, "Use Old Key on Iron Cabinet").unwrap();
        assert!(cabinet.success);
        assert!(cabinet.session.has_item("whispering_amulet"));

        let desk = game.engine.perform(id, "use old journal on intricate desk lock").unwrap();
        assert!(desk.success);
        assert_eq!(desk.message, "This puzzle is already solved.");
    }

    #[test]
    fn test_inspect_things() {
        let game = TestGame::new();
        let id = game.start_mystery();

        let shelves = game.engine.perform(id, "inspect dusty shelves").unwrap();
        assert!(shelves.success);
        assert_eq!(shelves.message, "Row upon row of forgotten volumes.");

        let puzzle = game.engine.perform(id, "examine observation").unwrap();
        assert!(puzzle.message.contains("Count the lights"));

        let nothing = game.engine.perform(id, "inspect unicorn").unwrap();
        assert!(!nothing.success);
    }
}
