//! Referential integrity checks for catalog content.

use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use super::{Catalog, Effect, Theme};

/// A data-integrity defect in a theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrityIssue {
    UnknownStartRoom { theme: String, room: String },
    UnknownTerminalRoom { theme: String, room: String },
    DanglingExit {
        theme: String,
        room: String,
        direction: String,
        target: String,
    },
    DanglingNextRoom {
        theme: String,
        room: String,
        target: String,
    },
    UnknownTriggeredPuzzle {
        theme: String,
        room: String,
        interactable: String,
        puzzle: String,
    },
    /// Not reachable from the theme's start room.
    OrphanRoom { theme: String, room: String },
}

impl std::fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityIssue::UnknownStartRoom { theme, room } => {
                write!(f, "{}: start room {} does not exist", theme, room)
            }
            IntegrityIssue::UnknownTerminalRoom { theme, room } => {
                write!(f, "{}: terminal room {} does not exist", theme, room)
            }
            IntegrityIssue::DanglingExit {
                theme,
                room,
                direction,
                target,
            } => write!(
                f,
                "{}: exit {} of {} points at unknown room {}",
                theme, direction, room, target
            ),
            IntegrityIssue::DanglingNextRoom { theme, room, target } => {
                write!(f, "{}: next room of {} is unknown room {}", theme, room, target)
            }
            IntegrityIssue::UnknownTriggeredPuzzle {
                theme,
                room,
                interactable,
                puzzle,
            } => write!(
                f,
                "{}: {} in {} triggers unknown puzzle {}",
                theme, interactable, room, puzzle
            ),
            IntegrityIssue::OrphanRoom { theme, room } => {
                write!(f, "{}: room {} is unreachable", theme, room)
            }
        }
    }
}

impl Theme {
    /// Collect every integrity defect in this theme.
    pub fn integrity_issues(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();

        if !self.has_room(&self.start_room) {
            issues.push(IntegrityIssue::UnknownStartRoom {
                theme: self.id.clone(),
                room: self.start_room.clone(),
            });
        }
        if !self.has_room(&self.terminal_room) {
            issues.push(IntegrityIssue::UnknownTerminalRoom {
                theme: self.id.clone(),
                room: self.terminal_room.clone(),
            });
        }

        for room in &self.rooms {
            for (direction, target) in &room.exits {
                if !self.has_room(target) {
                    issues.push(IntegrityIssue::DanglingExit {
                        theme: self.id.clone(),
                        room: room.id.clone(),
                        direction: direction.clone(),
                        target: target.clone(),
                    });
                }
            }

            if let Some(target) = &room.next_room_id {
                if !self.has_room(target) {
                    issues.push(IntegrityIssue::DanglingNextRoom {
                        theme: self.id.clone(),
                        room: room.id.clone(),
                        target: target.clone(),
                    });
                }
            }

            for interactable in &room.interactables {
                for action in &interactable.actions {
                    if let Effect::TriggerPuzzle { puzzle_id, .. } = &action.effect {
                        if room.puzzle(puzzle_id).is_none() {
                            issues.push(IntegrityIssue::UnknownTriggeredPuzzle {
                                theme: self.id.clone(),
                                room: room.id.clone(),
                                interactable: interactable.id.clone(),
                                puzzle: puzzle_id.clone(),
                            });
                        }
                    }
                }
            }
        }

        if self.has_room(&self.start_room) {
            let reachable = self.reachable_rooms();
            for room in &self.rooms {
                if !reachable.contains(room.id.as_str()) {
                    issues.push(IntegrityIssue::OrphanRoom {
                        theme: self.id.clone(),
                        room: room.id.clone(),
                    });
                }
            }
        }

        issues
    }

    /// Rooms reachable from the start room through exits and next-room links.
    pub fn reachable_rooms(&self) -> HashSet<&str> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(self.start_room.as_str());

        while let Some(room_id) = queue.pop_front() {
            if !seen.insert(room_id) {
                continue;
            }
            let Some(room) = self.room(room_id) else {
                continue;
            };
            for target in room.exits.values().chain(room.next_room_id.iter()) {
                if !seen.contains(target.as_str()) {
                    queue.push_back(target.as_str());
                }
            }
        }

        seen
    }
}

impl Catalog {
    /// Integrity defects across all themes.
    pub fn integrity_issues(&self) -> Vec<IntegrityIssue> {
        self.themes().flat_map(Theme::integrity_issues).collect()
    }
}
