//! Attempt normalization: free text to a canonical action token.

use escape_rules::slug;

use crate::config::{EngineConfig, SynonymRule};

/// What an attempt normalized to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedAttempt {
    /// Empty text or the inspect keyword.
    Inspect,
    /// Canonical action token.
    Action(String),
}

/// Maps attempt phrasings onto canonical tokens.
///
/// Rules apply in a fixed order: synonym phrases first (in configured order),
/// then the generic `use X on Y` pattern, then the cleaned text itself.
#[derive(Debug, Clone)]
pub struct Normalizer {
    inspect_keyword: String,
    synonyms: Vec<(Vec<Vec<String>>, String)>,
}

impl Normalizer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            inspect_keyword: clean(&config.inspect_keyword),
            synonyms: config.synonyms.iter().map(compile_rule).collect(),
        }
    }

    pub fn normalize(&self, attempt: &str) -> NormalizedAttempt {
        let text = clean(attempt);
        if text.is_empty() || text == self.inspect_keyword {
            return NormalizedAttempt::Inspect;
        }

        let words: Vec<&str> = text.split(' ').collect();
        for (phrases, canonical) in &self.synonyms {
            if phrases.iter().any(|phrase| contains_words(&words, phrase)) {
                tracing::debug!(attempt = %attempt, canonical = %canonical, "Attempt matched synonym");
                if clean(canonical) == self.inspect_keyword {
                    return NormalizedAttempt::Inspect;
                }
                return NormalizedAttempt::Action(canonical.clone());
            }
        }

        if let Some((item, target)) = split_use_on(&text) {
            return NormalizedAttempt::Action(use_token(item, target));
        }

        NormalizedAttempt::Action(text)
    }
}

fn compile_rule(rule: &SynonymRule) -> (Vec<Vec<String>>, String) {
    let phrases = rule
        .phrases
        .iter()
        .map(|p| {
            clean(p)
                .split(' ')
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect::<Vec<String>>()
        })
        .filter(|words| !words.is_empty())
        .collect();
    (phrases, rule.canonical.clone())
}

/// Lower-case, trimmed, single-spaced.
fn clean(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whether `phrase` appears as a contiguous run of whole words.
fn contains_words(words: &[&str], phrase: &[String]) -> bool {
    phrase.len() <= words.len()
        && words
            .windows(phrase.len())
            .any(|window| window.iter().zip(phrase).all(|(w, p)| *w == p.as_str()))
}

/// Split cleaned `use <item> on <target>` text.
pub(crate) fn split_use_on(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix("use ")?;
    let (item, target) = rest.split_once(" on ")?;
    let (item, target) = (item.trim(), target.trim());
    if item.is_empty() || target.is_empty() {
        return None;
    }
    Some((item, target))
}

/// Token for using an item on a target: `use_<item>_on_<target>`.
pub fn use_token(item: &str, target: &str) -> String {
    format!("use_{}_on_{}", slug(item), slug(target))
}

/// Comparison form: lower-case alphanumerics only.
pub fn compact(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether a normalized token matches a flattened canonical solution.
pub fn matches_solution(token: &str, solution: &str) -> bool {
    let expected = compact(solution);
    !expected.is_empty() && compact(token) == expected
}
