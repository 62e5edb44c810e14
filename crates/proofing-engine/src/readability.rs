//! Flesch-Kincaid grade level and reading time

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{Readability, ReadabilityLevel};

/// Average reading speed used for the time estimate
pub const WORDS_PER_MINUTE: usize = 200;

lazy_static! {
    static ref SENTENCE_BREAK: Regex = Regex::new(r"[.!?]+").unwrap();
    static ref VOWEL_GROUP: Regex = Regex::new(r"(?i)[aeiouy]{1,2}").unwrap();
}

pub fn sentence_count(text: &str) -> usize {
    SENTENCE_BREAK
        .split(text)
        .filter(|piece| !piece.is_empty())
        .count()
        .max(1)
}

/// Rough syllable estimate: one more than the number of vowel groups
pub fn syllable_count(text: &str) -> usize {
    VOWEL_GROUP.find_iter(text).count() + 1
}

pub fn calculate(text: &str) -> Readability {
    let words = text.split_whitespace().count();
    if words == 0 {
        return Readability::default();
    }

    let sentences = sentence_count(text);
    let syllables = syllable_count(text);

    let grade = 0.39 * (words as f64 / sentences as f64)
        + 11.8 * (syllables as f64 / words as f64)
        - 15.59;
    let grade = grade.round().max(0.0) as u32;

    let minutes = words.div_ceil(WORDS_PER_MINUTE);

    Readability {
        grade,
        estimated_reading_time: format!("{} min read", minutes),
        level: ReadabilityLevel::from_grade(grade),
    }
}
