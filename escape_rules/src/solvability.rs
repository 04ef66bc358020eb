//! Offline sanity check that a puzzle chain can be completed.
//!
//! [`verify_chain`] requires every prerequisite token to appear among the
//! chain's outcomes. [`verify_chain_with_items`] and [`verify_theme`] also
//! accept `item_` tokens for items a puzzle reveals or the player can find.
//! Both are necessary but not sufficient: cycles are not detected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::world::{Prerequisite, PuzzleDefinition, Theme};

/// Result of verifying a puzzle chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvabilityReport {
    pub solvable: bool,
    /// Prerequisite tokens nothing in the chain produces, sorted.
    pub unmet: Vec<String>,
}

impl SolvabilityReport {
    pub fn message(&self) -> String {
        if self.solvable {
            "Puzzle chain is solvable.".to_string()
        } else {
            format!("Unsolvable puzzle chain. Missing: {}", self.unmet.join(", "))
        }
    }
}

/// Verify a puzzle list against the union of its outcomes.
pub fn verify_chain(puzzles: &[PuzzleDefinition]) -> SolvabilityReport {
    let produced: BTreeSet<String> = puzzles
        .iter()
        .flat_map(|p| p.outcomes.iter().cloned())
        .collect();
    report(puzzles, &produced)
}

/// Verify a puzzle list, treating `available_items` as obtainable.
pub fn verify_chain_with_items<'a>(
    puzzles: &[PuzzleDefinition],
    available_items: impl IntoIterator<Item = &'a str>,
) -> SolvabilityReport {
    let mut produced: BTreeSet<String> = available_items
        .into_iter()
        .map(Prerequisite::item_token)
        .collect();

    for puzzle in puzzles {
        produced.extend(puzzle.outcomes.iter().cloned());
        produced.extend(puzzle.reveal_on_solve.iter().map(|i| Prerequisite::item_token(i)));
    }
    report(puzzles, &produced)
}

fn report(puzzles: &[PuzzleDefinition], produced: &BTreeSet<String>) -> SolvabilityReport {
    let unmet: Vec<String> = puzzles
        .iter()
        .flat_map(|p| p.prerequisites.iter())
        .filter(|token| !produced.contains(token.as_str()))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    SolvabilityReport {
        solvable: unmet.is_empty(),
        unmet,
    }
}

/// Verify every puzzle of a theme, counting items lying in its rooms.
pub fn verify_theme(theme: &Theme) -> SolvabilityReport {
    let puzzles: Vec<PuzzleDefinition> = theme
        .rooms
        .iter()
        .flat_map(|r| r.puzzles.iter().cloned())
        .collect();
    let items = theme.rooms.iter().flat_map(|r| r.items.iter().map(String::as_str));
    verify_chain_with_items(&puzzles, items)
}
