//! Selection rewrites and synonym lookup

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteMode {
    Formal,
    Casual,
    Concise,
}

const FORMAL_REPLACEMENTS: &[(&str, &str)] = &[("can't", "cannot"), ("I'm", "I am")];
const CASUAL_REPLACEMENTS: &[(&str, &str)] = &[("cannot", "can't"), ("hello", "hey")];

const THESAURUS: &[(&str, &[&str])] = &[
    ("good", &["excellent", "superb", "stellar", "admirable"]),
    ("bad", &["terrible", "atrocious", "unfavorable", "poor"]),
    ("happy", &["elated", "joyful", "content", "delighted"]),
    ("sad", &["despondent", "melancholy", "downcast", "sorrowful"]),
    ("big", &["massive", "colossal", "gigantic", "substantial"]),
    ("small", &["diminutive", "tiny", "petite", "minute"]),
    ("hard", &["difficult", "challenging", "arduous", "tough"]),
];

/// Rewrite `text` in the requested register
pub fn rewrite(text: &str, mode: RewriteMode) -> String {
    let replacements = match mode {
        RewriteMode::Formal => FORMAL_REPLACEMENTS,
        RewriteMode::Casual => CASUAL_REPLACEMENTS,
        RewriteMode::Concise => return text.to_string(),
    };
    replacements
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Synonyms for a single word; punctuation and case are ignored
pub fn synonyms(word: &str) -> &'static [&'static str] {
    let clean: String = word
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase())
        .collect();
    THESAURUS
        .iter()
        .find(|(key, _)| *key == clean)
        .map(|(_, words)| *words)
        .unwrap_or(&[])
}
