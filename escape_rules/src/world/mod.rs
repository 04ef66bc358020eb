//! The room graph: themes, rooms, puzzles and interactables.
//!
//! The catalog is loaded once and shared read-only by every session.

mod integrity;
mod interactable;
mod puzzle;

pub use integrity::*;
pub use interactable::*;
pub use puzzle::*;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Themes shipped with the game.
const BUILTIN_THEMES: &str = include_str!("../../data/themes.toml");

/// Errors raised while loading a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("duplicate theme id: {0}")]
    DuplicateTheme(String),

    #[error("duplicate room id {room} in theme {theme}")]
    DuplicateRoom { theme: String, room: String },

    #[error("duplicate puzzle id {puzzle} in room {room}")]
    DuplicatePuzzle { room: String, puzzle: String },
}

/// A node of a theme's navigation graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub description: String,

    #[serde(default)]
    pub image: Option<String>,

    /// Puzzles in declaration order. The first one is the room's main puzzle.
    #[serde(default)]
    pub puzzles: Vec<PuzzleDefinition>,

    #[serde(default)]
    pub interactables: Vec<Interactable>,

    /// Direction label -> destination room id.
    #[serde(default)]
    pub exits: BTreeMap<String, String>,

    /// Next room in the intended sequence.
    #[serde(default)]
    pub next_room_id: Option<String>,

    /// Items lying in the room at the start of a run.
    #[serde(default)]
    pub items: Vec<String>,
}

impl Room {
    /// Create an empty room.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_puzzle(mut self, puzzle: PuzzleDefinition) -> Self {
        self.puzzles.push(puzzle);
        self
    }

    pub fn with_interactable(mut self, interactable: Interactable) -> Self {
        self.interactables.push(interactable);
        self
    }

    pub fn with_exit(mut self, direction: impl Into<String>, room_id: impl Into<String>) -> Self {
        self.exits.insert(direction.into(), room_id.into());
        self
    }

    pub fn with_next_room(mut self, room_id: impl Into<String>) -> Self {
        self.next_room_id = Some(room_id.into());
        self
    }

    pub fn with_item(mut self, item_id: impl Into<String>) -> Self {
        self.items.push(item_id.into());
        self
    }

    /// Get a puzzle by id.
    pub fn puzzle(&self, puzzle_id: &str) -> Option<&PuzzleDefinition> {
        self.puzzles.iter().find(|p| p.id == puzzle_id)
    }

    /// The first declared puzzle.
    pub fn main_puzzle(&self) -> Option<&PuzzleDefinition> {
        self.puzzles.first()
    }

    /// Get an interactable by id.
    pub fn interactable(&self, interactable_id: &str) -> Option<&Interactable> {
        self.interactables.iter().find(|i| i.id == interactable_id)
    }

    /// Destination of the exit labeled `direction`, ignoring case.
    pub fn exit(&self, direction: &str) -> Option<&str> {
        let direction = direction.trim();
        self.exits
            .iter()
            .find(|(label, _)| label.eq_ignore_ascii_case(direction))
            .map(|(_, target)| target.as_str())
    }

}

/// Narrative-state key for a room's current item list.
pub fn room_items_key(room_id: &str) -> String {
    format!("room_{}_items", room_id)
}

/// A scenario bundling a set of rooms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Theme {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub intro_story: String,
    pub start_room: String,
    /// Reaching this room with every other puzzle solved wins the game.
    pub terminal_room: String,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

impl Theme {
    /// Get a room by id.
    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == room_id)
    }

    /// Check if a room belongs to this theme.
    pub fn has_room(&self, room_id: &str) -> bool {
        self.room(room_id).is_some()
    }

    pub fn is_terminal(&self, room_id: &str) -> bool {
        self.terminal_room == room_id
    }

    /// Ids of every puzzle outside the terminal room.
    pub fn non_terminal_puzzle_ids(&self) -> Vec<&str> {
        self.rooms
            .iter()
            .filter(|r| !self.is_terminal(&r.id))
            .flat_map(|r| r.puzzles.iter().map(|p| p.id.as_str()))
            .collect()
    }

    /// Summary for game-setup menus.
    pub fn summary(&self) -> ThemeSummary {
        ThemeSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            start_room: self.start_room.clone(),
        }
    }
}

/// Theme listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub start_room: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    themes: Vec<Theme>,
}

/// Process-wide, immutable collection of themes.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    themes: Vec<Theme>,
}

impl Catalog {
    /// Build a catalog from themes, rejecting duplicate ids.
    pub fn from_themes(themes: Vec<Theme>) -> Result<Self, CatalogError> {
        let mut theme_ids = HashSet::new();

        for theme in &themes {
            if !theme_ids.insert(theme.id.as_str()) {
                return Err(CatalogError::DuplicateTheme(theme.id.clone()));
            }

            let mut room_ids = HashSet::new();
            for room in &theme.rooms {
                if !room_ids.insert(room.id.as_str()) {
                    return Err(CatalogError::DuplicateRoom {
                        theme: theme.id.clone(),
                        room: room.id.clone(),
                    });
                }

                let mut puzzle_ids = HashSet::new();
                for puzzle in &room.puzzles {
                    if !puzzle_ids.insert(puzzle.id.as_str()) {
                        return Err(CatalogError::DuplicatePuzzle {
                            room: room.id.clone(),
                            puzzle: puzzle.id.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self { themes })
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(source)?;
        Self::from_themes(file.themes)
    }

    /// The catalog shipped with the game.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_THEMES)
    }

    /// Get a theme by id.
    pub fn theme(&self, theme_id: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.id == theme_id)
    }

    /// Get a room of a theme.
    pub fn room(&self, theme_id: &str, room_id: &str) -> Option<&Room> {
        self.theme(theme_id)?.room(room_id)
    }

    /// Get a puzzle of a room.
    pub fn puzzle(&self, theme_id: &str, room_id: &str, puzzle_id: &str) -> Option<&PuzzleDefinition> {
        self.room(theme_id, room_id)?.puzzle(puzzle_id)
    }

    /// All themes in declaration order.
    pub fn themes(&self) -> impl Iterator<Item = &Theme> {
        self.themes.iter()
    }

    /// Setup-menu summaries for all themes.
    pub fn theme_summaries(&self) -> Vec<ThemeSummary> {
        self.themes.iter().map(Theme::summary).collect()
    }

    pub fn theme_count(&self) -> usize {
        self.themes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.theme_count() >= 3);

        let library = catalog.room("mystery", "ancient_library").unwrap();
        assert_eq!(library.name, "Ancient Library");
        assert_eq!(library.exit("north"), Some("mysterious_observatory"));
        let observation = catalog.puzzle("mystery", "ancient_library", "observation_puzzle").unwrap();
        assert_eq!(observation.solution.flattened(), "3");
        let riddle = catalog
            .puzzle("mystery", "mysterious_observatory", "riddle_puzzle")
            .unwrap();
        assert_eq!(riddle.solution.flattened(), "map");

        let chamber = catalog.room("mystery", "escape_chamber").unwrap();
        assert!(chamber.puzzles.is_empty());
        assert_eq!(chamber.exit("west"), Some("mysterious_observatory"));
    }

    #[test]
    fn test_lookups_fail_on_absent_ids() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.theme("nonexistent").is_none());
        assert!(catalog.room("mystery", "nonexistent").is_none());
        assert!(catalog.room("nonexistent", "ancient_library").is_none());
        assert!(catalog.puzzle("mystery", "ancient_library", "riddle_puzzle").is_none());
        assert!(catalog
            .puzzle("mystery", "mysterious_observatory", "riddle_puzzle")
            .is_some());
    }

    #[test]
    fn test_exit_lookup_is_case_insensitive() {
        let room = Room::new("hall", "Hall").with_exit("north", "study");
        assert_eq!(room.exit("NORTH"), Some("study"));
        assert_eq!(room.exit(" North "), Some("study"));
        assert_eq!(room.exit("south"), None);
    }

    #[test]
    fn test_non_terminal_puzzles() {
        let catalog = Catalog::builtin().unwrap();
        let theme = catalog.theme("mystery").unwrap();
        let mut ids = theme.non_terminal_puzzle_ids();
        ids.sort();
        assert_eq!(ids, vec!["observation_puzzle", "riddle_puzzle"]);
    }

    #[test]
    fn test_duplicate_room_rejected() {
        let theme = Theme {
            id: "t".into(),
            name: "T".into(),
            start_room: "a".into(),
            terminal_room: "a".into(),
            rooms: vec![Room::new("a", "A"), Room::new("a", "A again")],
            ..Default::default()
        };

        let result = Catalog::from_themes(vec![theme]);
        assert!(matches!(result, Err(CatalogError::DuplicateRoom { .. })));
    }

    #[test]
    fn test_same_puzzle_id_in_different_rooms() {
        let theme = |id: &str, answer: &str| Theme {
            id: id.into(),
            name: id.into(),
            start_room: "hall".into(),
            terminal_room: "vault".into(),
            rooms: vec![
                Room::new("hall", "Hall").with_puzzle(PuzzleDefinition::new("lock", "Lock", answer)),
                Room::new("vault", "Vault").with_puzzle(PuzzleDefinition::new("lock", "Lock", "vault")),
            ],
            ..Default::default()
        };

        let catalog = Catalog::from_themes(vec![theme("first", "one"), theme("second", "two")]).unwrap();
        let answer = |theme: &str, room: &str| catalog.puzzle(theme, room, "lock").unwrap().solution.flattened();
        assert_eq!(answer("first", "hall"), "one");
        assert_eq!(answer("second", "hall"), "two");
        assert_eq!(answer("first", "vault"), "vault");
    }

    #[test]
    fn test_theme_summaries() {
        let catalog = Catalog::builtin().unwrap();
        let summaries = catalog.theme_summaries();
        let mystery = summaries.iter().find(|s| s.id == "mystery").unwrap();
        assert_eq!(mystery.start_room, "ancient_library");
    }
}
