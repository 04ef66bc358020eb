//! Game mechanics: difficulty levels and hint budgets.

use serde::{Deserialize, Serialize};

/// Difficulty chosen at game setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Parse a difficulty label. Unknown labels play as medium.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }

    /// Number of hints a session starts with.
    pub fn hint_budget(&self) -> u32 {
        match self {
            Difficulty::Easy => 8,
            Difficulty::Medium => 5,
            Difficulty::Hard => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Hint budget for a free-form difficulty label.
pub fn hint_budget_for(label: &str) -> u32 {
    Difficulty::from_label(label).hint_budget()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_budgets() {
        assert_eq!(hint_budget_for("easy"), 8);
        assert_eq!(hint_budget_for("medium"), 5);
        assert_eq!(hint_budget_for("hard"), 3);
        assert_eq!(hint_budget_for("nightmare"), 5);
        assert_eq!(hint_budget_for(""), 5);
    }

    #[test]
    fn test_label_parsing_ignores_case() {
        assert_eq!(Difficulty::from_label(" HARD "), Difficulty::Hard);
        assert_eq!(Difficulty::from_label("Easy").to_string(), "easy");
    }
}
