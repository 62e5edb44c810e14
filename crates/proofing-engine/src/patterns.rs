//! Built-in rule table, tone vocabulary and match helpers

use regex::Regex;
use shared_types::IssueKind;

/// A static replacement rule: `phrase` is matched case-insensitively on word boundaries
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub id: &'static str,
    pub phrase: &'static str,
    pub kind: IssueKind,
    pub suggestion: &'static str,
    pub reason: &'static str,
}

/// Rules shipped with the local engine, in reporting order
pub const BUILTIN_RULES: &[RuleSpec] = &[
    RuleSpec {
        id: "spelling.thier",
        phrase: "thier",
        kind: IssueKind::Spelling,
        suggestion: "their",
        reason: "Spelling error",
    },
    RuleSpec {
        id: "spelling.recieve",
        phrase: "recieve",
        kind: IssueKind::Spelling,
        suggestion: "receive",
        reason: "Spelling error",
    },
    RuleSpec {
        id: "clarity.very_good",
        phrase: "very good",
        kind: IssueKind::Clarity,
        suggestion: "excellent",
        reason: "Weak vocabulary",
    },
    RuleSpec {
        id: "tone.literally",
        phrase: "literally",
        kind: IssueKind::Tone,
        suggestion: "virtually",
        reason: "Informal tone",
    },
    RuleSpec {
        id: "vocabulary.happy",
        phrase: "happy",
        kind: IssueKind::Vocabulary,
        suggestion: "elated",
        reason: "Enhance description",
    },
    RuleSpec {
        id: "grammar.cant",
        phrase: "cant",
        kind: IssueKind::Grammar,
        suggestion: "can't",
        reason: "Missing apostrophe",
    },
];

/// Excited-tone keywords
pub const EXCITED_KEYWORDS: &[&str] = &[
    "amazing",
    "awesome",
    "love",
    "fantastic",
    "great",
    "happy",
    "excited",
    "best",
    "win",
    "wow",
    "!!",
];

/// Concerned-tone keywords
pub const CONCERNED_KEYWORDS: &[&str] = &[
    "worry", "afraid", "urgent", "error", "fail", "bad", "sorry", "hate", "terrible", "warning",
    "risk",
];

/// Friendly-tone keywords
pub const FRIENDLY_KEYWORDS: &[&str] = &[
    "hey", "hello", "thanks", "cheers", "help", "welcome", "friend", "cool", "nice", "good",
];

/// Serious-tone keywords
pub const SERIOUS_KEYWORDS: &[&str] = &[
    "report", "data", "analysis", "confirm", "request", "deadline", "meeting", "attached",
    "ensure",
];

/// Compile a case-insensitive, word-bounded matcher for a literal phrase
pub fn phrase_regex(phrase: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(phrase)))
}

/// Byte ranges of every non-overlapping match of `re` in `text`
pub fn find_all_positions(re: &Regex, text: &str) -> Vec<(usize, usize)> {
    re.find_iter(text).map(|m| (m.start(), m.end())).collect()
}

/// Number of keywords from `keywords` that occur anywhere in `text_lower`
pub fn count_keyword_hits(text_lower: &str, keywords: &[&str]) -> usize {
    keywords
        .iter()
        .filter(|keyword| text_lower.contains(*keyword))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_regex_respects_word_boundaries() {
        let re = phrase_regex("cant").unwrap();
        assert_eq!(find_all_positions(&re, "I cant go"), vec![(2, 6)]);
        assert!(find_all_positions(&re, "a cantilever").is_empty());
        assert_eq!(find_all_positions(&re, "CANT stop"), vec![(0, 4)]);
    }

    #[test]
    fn test_phrase_regex_matches_multi_word_phrases() {
        let re = phrase_regex("very good").unwrap();
        assert_eq!(find_all_positions(&re, "It was Very Good."), vec![(7, 16)]);
    }

    #[test]
    fn test_phrase_regex_escapes_metacharacters() {
        let re = phrase_regex("e.g").unwrap();
        assert!(find_all_positions(&re, "exg").is_empty());
        assert_eq!(find_all_positions(&re, "see e.g here").len(), 1);
    }

    #[test]
    fn test_count_keyword_hits() {
        assert_eq!(count_keyword_hits("wow, this is great!!", EXCITED_KEYWORDS), 3);
        assert_eq!(count_keyword_hits("nothing here", SERIOUS_KEYWORDS), 0);
    }

    #[test]
    fn test_builtin_rule_ids_are_unique() {
        let mut ids: Vec<&str> = BUILTIN_RULES.iter().map(|rule| rule.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), BUILTIN_RULES.len());
    }
}
