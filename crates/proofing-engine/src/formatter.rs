//! Punctuation and capitalisation auto-format

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::error::ProviderError;

lazy_static! {
    static ref LEADING_LOWER: Regex = Regex::new(r"^\s*[a-z]").unwrap();
    static ref SENTENCE_START: Regex = Regex::new(r"([.?!]\s+)([a-z])").unwrap();
    static ref LONE_I: Regex = Regex::new(r"\b(i)\b").unwrap();
    static ref IM: Regex = Regex::new(r"(?i)\b(im)\b").unwrap();
    static ref DONT: Regex = Regex::new(r"(?i)\b(dont)\b").unwrap();
    static ref CANT: Regex = Regex::new(r"(?i)\b(cant)\b").unwrap();
    static ref ITS_ADJECTIVE: Regex =
        Regex::new(r"(?i)\b(its)\s+(fun|cool|great|bad|hard|easy)\b").unwrap();
    static ref MISSING_SPACE: Regex = Regex::new(r"([,.;?!])([a-zA-Z])").unwrap();
    static ref CONJUNCTION: Regex =
        Regex::new(r"([a-z])\s+(but|so|however|therefore)\s+([a-z])").unwrap();
    static ref TERMINAL_PUNCTUATION: Regex = Regex::new(r"[.!?]$").unwrap();
}

/// Rewrites a whole document into a formatted version
#[async_trait]
pub trait Formatter: Send + Sync {
    fn name(&self) -> &str;

    async fn format(&self, text: &str) -> Result<String, ProviderError>;
}

/// Deterministic rule-based formatter
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleFormatter;

#[async_trait]
impl Formatter for RuleFormatter {
    fn name(&self) -> &str {
        "rules"
    }

    async fn format(&self, text: &str) -> Result<String, ProviderError> {
        Ok(smart_fix(text))
    }
}

pub fn smart_fix(input: &str) -> String {
    let res = LEADING_LOWER.replace(input, |caps: &Captures| caps[0].to_uppercase());
    let res = SENTENCE_START.replace_all(&res, |caps: &Captures| {
        format!("{}{}", &caps[1], caps[2].to_uppercase())
    });
    let res = LONE_I.replace_all(&res, "I");
    let res = IM.replace_all(&res, "I'm");
    let res = DONT.replace_all(&res, "don't");
    let res = CANT.replace_all(&res, "can't");
    let res = ITS_ADJECTIVE.replace_all(&res, "it's ${2}");
    let res = MISSING_SPACE.replace_all(&res, "${1} ${2}");
    let res = CONJUNCTION.replace_all(&res, "${1}, ${2} ${3}");

    let mut res = res.into_owned();
    if res.chars().count() > 5 && !TERMINAL_PUNCTUATION.is_match(res.trim()) {
        res = format!("{}.", res.trim());
    }
    res
}
