//! LanguageTool HTTP issue source
//!
//! Sends the text to a LanguageTool-compatible `/v2/check` endpoint and maps
//! the returned matches to findings. LanguageTool reports offsets in UTF-16
//! code units; they are converted to byte offsets here.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use shared_types::{IssueKind, Span};

use crate::analyzer::{Finding, IssueSource};
use crate::error::ProviderError;

pub const DEFAULT_ENDPOINT: &str = "https://api.languagetool.org/v2/check";
pub const DEFAULT_LANGUAGE: &str = "en-US";

#[derive(Debug, Clone, Deserialize)]
pub struct CheckResponse {
    #[serde(default)]
    pub matches: Vec<CheckMatch>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckMatch {
    pub message: String,
    pub offset: usize,
    pub length: usize,
    #[serde(default)]
    pub replacements: Vec<Replacement>,
    pub rule: MatchRule,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Replacement {
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchRule {
    pub id: String,
    #[serde(rename = "issueType", default)]
    pub issue_type: String,
}

#[derive(Debug, Clone)]
pub struct LanguageToolSource {
    client: reqwest::Client,
    endpoint: String,
    language: String,
}

impl LanguageToolSource {
    pub fn new(
        endpoint: impl Into<String>,
        language: impl Into<String>,
        timeout_ms: u64,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            language: language.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl IssueSource for LanguageToolSource {
    fn name(&self) -> &str {
        "languagetool"
    }

    async fn check(&self, text: &str) -> Result<Vec<Finding>, ProviderError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("text", text),
                ("language", self.language.as_str()),
                ("enabledOnly", "false"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: CheckResponse = response.json().await?;
        tracing::debug!(matches = body.matches.len(), "LanguageTool response");
        Ok(findings_from_response(text, &body))
    }
}

/// Map LanguageTool's issue categories onto ours
pub fn map_issue_type(issue_type: &str) -> IssueKind {
    match issue_type {
        "misspelling" => IssueKind::Spelling,
        "style" => IssueKind::Clarity,
        "typographical" => IssueKind::Grammar,
        "uncategorized" => IssueKind::Tone,
        _ => IssueKind::Grammar,
    }
}

/// Convert matches to findings, dropping any whose offsets do not map onto `text`
pub fn findings_from_response(text: &str, response: &CheckResponse) -> Vec<Finding> {
    response
        .matches
        .iter()
        .filter_map(|m| {
            let start = utf16_to_byte_offset(text, m.offset)?;
            let end = utf16_to_byte_offset(text, m.offset.checked_add(m.length)?)?;
            if start >= end {
                return None;
            }
            Some(Finding {
                span: Span::new(start, end),
                kind: map_issue_type(&m.rule.issue_type),
                suggestion: m.replacements.first().map(|r| r.value.clone()),
                rationale: m.message.clone(),
                rule_id: Some(m.rule.id.clone()),
            })
        })
        .collect()
}

/// Byte offset of the char boundary at `utf16_offset`, or `None` if it
/// falls inside a surrogate pair or past the end
pub fn utf16_to_byte_offset(text: &str, utf16_offset: usize) -> Option<usize> {
    let mut units = 0;
    for (byte_idx, ch) in text.char_indices() {
        if units == utf16_offset {
            return Some(byte_idx);
        }
        if units > utf16_offset {
            return None;
        }
        units += ch.len_utf16();
    }
    (units == utf16_offset).then_some(text.len())
}
