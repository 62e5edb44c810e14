//! Keyword-based tone classifier
//!
//! The local fallback for tone detection. Each tone has a keyword list; the
//! tone with the most keywords present wins.

use async_trait::async_trait;
use shared_types::{Tone, ToneLabel};

use crate::analyzer::ToneClassifier;
use crate::error::ProviderError;
use crate::patterns::{
    count_keyword_hits, CONCERNED_KEYWORDS, EXCITED_KEYWORDS, FRIENDLY_KEYWORDS,
    SERIOUS_KEYWORDS,
};

/// Texts shorter than this (in chars) are always neutral
pub const MIN_TONE_TEXT_CHARS: usize = 5;

const TONE_VOCABULARY: &[(ToneLabel, &[&str])] = &[
    (ToneLabel::Excited, EXCITED_KEYWORDS),
    (ToneLabel::Concerned, CONCERNED_KEYWORDS),
    (ToneLabel::Friendly, FRIENDLY_KEYWORDS),
    (ToneLabel::Serious, SERIOUS_KEYWORDS),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordToneClassifier;

impl KeywordToneClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify_text(&self, text: &str) -> Tone {
        if text.chars().count() < MIN_TONE_TEXT_CHARS {
            return Tone::neutral();
        }

        let text_lower = text.to_lowercase();
        let mut winner = (ToneLabel::Neutral, 0usize);
        for (label, keywords) in TONE_VOCABULARY {
            let hits = count_keyword_hits(&text_lower, keywords);
            // Ties go to the later tone
            if winner.0 == ToneLabel::Neutral || hits >= winner.1 {
                winner = (*label, hits);
            }
        }

        match winner {
            (_, 0) => Tone::neutral(),
            (label, hits) => Tone::new(label, (60 + hits * 10).min(99) as u8),
        }
    }
}

#[async_trait]
impl ToneClassifier for KeywordToneClassifier {
    fn name(&self) -> &str {
        "keywords"
    }

    async fn classify(&self, text: &str) -> Result<Tone, ProviderError> {
        Ok(self.classify_text(text))
    }
}
