//! Contextual options: the actions currently open to the player.

use escape_rules::{display_name, Effect, Room, SessionState, Theme};
use std::collections::BTreeSet;

use crate::resolution::{first_unmet, inspection_text};

pub const LOOK_AROUND: &str = "Look around";
pub const GO_BACK: &str = "Go back";

/// Items lying in a room, seeded from its static list until first touched.
pub fn items_in_room<'a>(session: &'a SessionState, room: &'a Room) -> &'a [String] {
    session.room_items(&room.id).unwrap_or(room.items.as_slice())
}

/// Whether every puzzle of the room is solved. Puzzle-free rooms count as complete.
pub fn room_completed(session: &SessionState, room: &Room) -> bool {
    room.puzzles.iter().all(|p| session.is_solved(&p.id))
}

/// Next room in sequence, once the room's main puzzle is solved.
pub fn unlocked_next_room<'t>(theme: &'t Theme, session: &SessionState, room: &Room) -> Option<&'t Room> {
    let main = room.main_puzzle()?;
    if !session.is_solved(&main.id) {
        return None;
    }
    theme.room(room.next_room_id.as_deref()?)
}

/// Deduplicated, sorted list of option labels for the session's current room.
pub fn contextual_options(session: &SessionState, theme: &Theme) -> Vec<String> {
    let mut options = BTreeSet::new();
    options.insert(LOOK_AROUND.to_string());

    let Some(room) = theme.room(&session.current_room) else {
        return options.into_iter().collect();
    };

    for interactable in &room.interactables {
        for action in &interactable.actions {
            let suppressed = match &action.effect {
                effect if effect.is_movement() => true,
                Effect::TriggerPuzzle { puzzle_id, .. } => session.is_solved(puzzle_id),
                _ => false,
            };
            if !suppressed {
                options.insert(action.label.clone());
            }
        }
    }

    for puzzle in &room.puzzles {
        if session.is_solved(&puzzle.id) || first_unmet(session, puzzle).is_some() {
            continue;
        }
        let in_progress = session
            .progress(&puzzle.id)
            .and_then(|p| p.next_step.as_ref())
            .is_some();
        if in_progress {
            options.insert(inspection_text(session, puzzle));
        } else {
            options.insert(format!("Solve {}", puzzle.name));
        }
    }

    for item in items_in_room(session, room) {
        if !session.has_item(item) {
            options.insert(format!("Pick up {}", display_name(item)));
        }
    }

    for item in &session.inventory {
        let item_name = display_name(item);
        for interactable in &room.interactables {
            options.insert(format!("Use {} on {}", item_name, interactable.name));
        }
        for puzzle in &room.puzzles {
            if !session.is_solved(&puzzle.id) && puzzle.requires_item(item) {
                options.insert(format!("Use {} on {}", item_name, puzzle.name));
            }
        }
    }

    let next = unlocked_next_room(theme, session, room);
    if let Some(next) = next {
        options.insert(format!("Go to {}", next.name));
    }

    let forward_open = next.is_some() || (!room.puzzles.is_empty() && room_completed(session, room));
    if !session.history.is_empty() && !forward_open {
        options.insert(GO_BACK.to_string());
    }

    options.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use escape_rules::Catalog;

    fn session_in(theme: &str, room: &str) -> SessionState {
        SessionState::new("p1", theme, room, "medium", Utc::now())
    }

    #[test]
    fn test_fresh_library_options() {
        let catalog = Catalog::builtin().unwrap();
        let theme = catalog.theme("mystery").unwrap();
        let session = session_in("mystery", "ancient_library");

        let options = contextual_options(&session, theme);

        assert!(options.contains(&"Look around".to_string()));
        assert!(options.contains(&"Examine Reading Desk".to_string()));
        assert!(options.contains(&"Search Shelves".to_string()));
        assert!(options.contains(&"Solve Candle Count".to_string()));
        assert!(options.contains(&"Pick up Brass Key".to_string()));
        assert!(!options.iter().any(|o| o.starts_with("Go to")));
        assert!(!options.contains(&"Go back".to_string()));

        let mut sorted = options.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(options, sorted);
    }

    #[test]
    fn test_solving_main_puzzle_opens_forward_and_hides_trigger() {
        let catalog = Catalog::builtin().unwrap();
        let theme = catalog.theme("mystery").unwrap();
        let mut session = session_in("mystery", "ancient_library");
        session.progress_mut("observation_puzzle").solved = true;
        session.history.push("escape_chamber".into());

        let options = contextual_options(&session, theme);

        assert!(options.contains(&"Go to Mysterious Observatory".to_string()));
        assert!(!options.contains(&"Examine Reading Desk".to_string()));
        assert!(!options.contains(&"Solve Candle Count".to_string()));
        // Forward progress supersedes backtracking.
        assert!(!options.contains(&"Go back".to_string()));
    }

    #[test]
    fn test_go_back_and_gated_puzzles() {
        let catalog = Catalog::builtin().unwrap();
        let theme = catalog.theme("mystery").unwrap();
        let mut session = session_in("mystery", "mysterious_observatory");
        session.history.push("ancient_library".into());

        let options = contextual_options(&session, theme);
        assert!(options.contains(&"Go back".to_string()));
        assert!(!options.contains(&"Solve Plaque Riddle".to_string()));

        session.set_flag("library_clue_found");
        let options = contextual_options(&session, theme);
        assert!(options.contains(&"Solve Plaque Riddle".to_string()));
    }

    #[test]
    fn test_item_options_follow_dynamic_room_list() {
        let catalog = Catalog::builtin().unwrap();
        let theme = catalog.theme("forgotten_library").unwrap();
        let mut session = session_in("forgotten_library", "forgotten_library_study");

        session.add_item("old_key");
        session.set_room_items("forgotten_library_study", vec!["quill".into()]);
        let options = contextual_options(&session, theme);

        assert!(options.contains(&"Pick up Quill".to_string()));
        assert!(!options.contains(&"Pick up Old Key".to_string()));
        assert!(options.contains(&"Use Old Key on Intricate Desk Lock".to_string()));
        assert!(options.contains(&"Use Old Key on Iron Cabinet".to_string()));
    }

    #[test]
    fn test_next_step_replaces_solve_option() {
        let catalog = Catalog::builtin().unwrap();
        let theme = catalog.theme("mystery").unwrap();
        let mut session = session_in("mystery", "ancient_library");
        session.progress_mut("observation_puzzle").next_step = Some("Turn the dial".into());

        let options = contextual_options(&session, theme);
        assert!(options.contains(&"Turn the dial".to_string()));
        assert!(!options.contains(&"Solve Candle Count".to_string()));
    }
}
