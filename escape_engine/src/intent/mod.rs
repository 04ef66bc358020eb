//! Player intent parsing.
//!
//! Free text is matched against an ordered list of patterns; the first match
//! wins. More specific patterns come first so they are not shadowed:
//!
//! 1. `look around` / `look`
//! 2. `go back` / `back`
//! 3. `go to <room>` (before plain `go <direction>`)
//! 4. `go <direction>`, `move <direction>`, or a bare direction
//! 5. `pick up <item>`, `take <item>`, `grab <item>`
//! 6. `use <item> on <target>`, then `use <item>`
//! 7. `solve <puzzle> with <answer>`, then `solve <puzzle>`
//! 8. `inspect <thing>`, `examine <thing>`
//!
//! Anything else is [`Command::Unknown`].

mod normalize;

pub use normalize::*;

/// A structured player command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LookAround,
    GoBack,
    GoToRoom(String),
    Move(String),
    PickUp(String),
    UseItemOn {
        item: String,
        target: Option<String>,
    },
    SolvePuzzle {
        puzzle: String,
        attempt: Option<String>,
    },
    Inspect(String),
    Unknown(String),
}

const DIRECTIONS: &[&str] = &[
    "north", "south", "east", "west", "up", "down", "northeast", "northwest", "southeast",
    "southwest",
];

type Matcher = fn(&str) -> Option<Command>;

const PATTERNS: &[Matcher] = &[
    look_around,
    go_back,
    go_to_room,
    movement,
    pick_up,
    use_item,
    solve_puzzle,
    inspect,
];

/// Parse free text into a command.
pub fn parse_command(input: &str) -> Command {
    let text = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let lowered = text.to_lowercase();

    PATTERNS
        .iter()
        .find_map(|pattern| pattern(&lowered))
        .unwrap_or(Command::Unknown(text))
}

fn look_around(text: &str) -> Option<Command> {
    matches!(text, "look around" | "look").then_some(Command::LookAround)
}

fn go_back(text: &str) -> Option<Command> {
    matches!(text, "go back" | "back").then_some(Command::GoBack)
}

fn go_to_room(text: &str) -> Option<Command> {
    rest_after(text, &["go to "]).map(|room| Command::GoToRoom(room.to_string()))
}

fn movement(text: &str) -> Option<Command> {
    let direction = rest_after(text, &["go ", "move ", "walk "]).unwrap_or(text);
    DIRECTIONS
        .contains(&direction)
        .then(|| Command::Move(direction.to_string()))
}

fn pick_up(text: &str) -> Option<Command> {
    rest_after(text, &["pick up ", "take ", "grab "]).map(|item| Command::PickUp(item.to_string()))
}

fn use_item(text: &str) -> Option<Command> {
    if let Some((item, target)) = split_use_on(text) {
        return Some(Command::UseItemOn {
            item: item.to_string(),
            target: Some(target.to_string()),
        });
    }
    rest_after(text, &["use "]).map(|item| Command::UseItemOn {
        item: item.to_string(),
        target: None,
    })
}

fn solve_puzzle(text: &str) -> Option<Command> {
    let rest = rest_after(text, &["solve "])?;
    Some(match rest.split_once(" with ") {
        Some((puzzle, answer)) if !puzzle.trim().is_empty() => Command::SolvePuzzle {
            puzzle: puzzle.trim().to_string(),
            attempt: Some(answer.trim().to_string()),
        },
        _ => Command::SolvePuzzle {
            puzzle: rest.to_string(),
            attempt: None,
        },
    })
}

fn inspect(text: &str) -> Option<Command> {
    rest_after(text, &["inspect ", "examine "]).map(|thing| Command::Inspect(thing.to_string()))
}

/// Text after the first matching prefix, if non-empty.
fn rest_after<'a>(text: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .map(str::trim)
        .filter(|rest| !rest.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_commands() {
        assert_eq!(parse_command("Look around"), Command::LookAround);
        assert_eq!(parse_command(" go  back "), Command::GoBack);
        assert_eq!(parse_command("North"), Command::Move("north".into()));
        assert_eq!(parse_command("move east"), Command::Move("east".into()));
        assert_eq!(
            parse_command("Go to Mysterious Observatory"),
            Command::GoToRoom("mysterious observatory".into())
        );
    }

    #[test]
    fn test_go_to_is_not_shadowed_by_go() {
        // "go to" must not be read as moving in direction "to ...".
        assert!(matches!(parse_command("go to north"), Command::GoToRoom(_)));
        assert!(matches!(parse_command("go sideways"), Command::Unknown(_)));
    }

    #[test]
    fn test_item_commands() {
        assert_eq!(parse_command("Pick up Brass Key"), Command::PickUp("brass key".into()));
        assert_eq!(parse_command("take lantern"), Command::PickUp("lantern".into()));
        assert_eq!(
            parse_command("Use Old Key on Cabinet"),
            Command::UseItemOn {
                item: "old key".into(),
                target: Some("cabinet".into())
            }
        );
        assert_eq!(
            parse_command("use plasma cutter"),
            Command::UseItemOn {
                item: "plasma cutter".into(),
                target: None
            }
        );
    }

    #[test]
    fn test_puzzle_commands() {
        assert_eq!(
            parse_command("Solve Candle Count"),
            Command::SolvePuzzle {
                puzzle: "candle count".into(),
                attempt: None
            }
        );
        assert_eq!(
            parse_command("solve candle count with 3"),
            Command::SolvePuzzle {
                puzzle: "candle count".into(),
                attempt: Some("3".into())
            }
        );
        assert_eq!(parse_command("examine plaque"), Command::Inspect("plaque".into()));
    }

    #[test]
    fn test_unknown_keeps_original_text() {
        assert_eq!(
            parse_command("Dance  wildly"),
            Command::Unknown("Dance wildly".into())
        );
        assert_eq!(parse_command(""), Command::Unknown(String::new()));
    }
}
