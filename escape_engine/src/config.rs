//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Phrases that all mean the same action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymRule {
    pub phrases: Vec<String>,
    /// Action token the phrases normalize to.
    pub canonical: String,
}

impl SynonymRule {
    pub fn new(phrases: &[&str], canonical: impl Into<String>) -> Self {
        Self {
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
            canonical: canonical.into(),
        }
    }
}

/// Tunables of the game engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum seconds between two granted hints.
    pub hint_cooldown_secs: i64,

    /// Attempt text treated as "show me the puzzle" rather than an answer.
    pub inspect_keyword: String,

    /// Checked in order, before the generic "use X on Y" pattern.
    pub synonyms: Vec<SynonymRule>,

    pub win_message: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hint_cooldown_secs: 15,
            inspect_keyword: "inspect".to_string(),
            synonyms: vec![
                SynonymRule::new(
                    &[
                        "examine symbol",
                        "examine the symbol",
                        "touch eye",
                        "touch the eye",
                        "press eye",
                        "press the eye",
                        "trace the tears",
                    ],
                    "eyetears",
                ),
                SynonymRule::new(&["look closer", "examine", "investigate"], "inspect"),
            ],
            win_message: "You escaped!".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn with_hint_cooldown(mut self, secs: i64) -> Self {
        self.hint_cooldown_secs = secs;
        self
    }
}
