use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::document::{DocVersion, Document};

/// Half-open byte range `[start, end)` within one document version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Spelling,
    Grammar,
    Clarity,
    Tone,
    Vocabulary,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueKind::Spelling => "spelling",
            IssueKind::Grammar => "grammar",
            IssueKind::Clarity => "clarity",
            IssueKind::Tone => "tone",
            IssueKind::Vocabulary => "vocabulary",
        };
        f.write_str(name)
    }
}

/// Span integrity violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IssueError {
    #[error("Empty span at {0}")]
    EmptySpan(usize),

    #[error("Span {start}..{end} is outside a document of length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("Span {start}..{end} does not fall on character boundaries")]
    NotCharBoundary { start: usize, end: usize },

    #[error("Expected '{expected}' at {start}..{end}, found '{found}'")]
    TextMismatch {
        start: usize,
        end: usize,
        expected: String,
        found: String,
    },
}

/// A detected problem anchored to a span of the document it was computed from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub kind: IssueKind,
    pub span: Span,
    pub original_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub rationale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    pub source_doc_version: DocVersion,
}

impl Issue {
    pub fn new(
        kind: IssueKind,
        span: Span,
        original_text: impl Into<String>,
        suggestion: Option<String>,
        rationale: impl Into<String>,
        source_doc_version: DocVersion,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            span,
            original_text: original_text.into(),
            suggestion,
            rationale: rationale.into(),
            rule_id: None,
            source_doc_version,
        }
    }

    /// Build an issue by reading `span` out of `doc`, validating it first
    pub fn from_document(
        doc: &Document,
        kind: IssueKind,
        span: Span,
        suggestion: Option<String>,
        rationale: impl Into<String>,
    ) -> Result<Self, IssueError> {
        let original = check_span(doc, span)?;
        Ok(Self::new(
            kind,
            span,
            original,
            suggestion,
            rationale,
            doc.version(),
        ))
    }

    pub fn with_rule_id(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    /// Check `doc[start..end] == original_text` against whatever version `doc` is
    pub fn validate_against(&self, doc: &Document) -> Result<(), IssueError> {
        let found = check_span(doc, self.span)?;
        if found != self.original_text {
            return Err(IssueError::TextMismatch {
                start: self.span.start,
                end: self.span.end,
                expected: self.original_text.clone(),
                found: found.to_string(),
            });
        }
        Ok(())
    }

    /// Whether this issue was computed against `doc`'s version
    pub fn is_from(&self, doc: &Document) -> bool {
        self.source_doc_version == doc.version()
    }

    /// Case-insensitive comparison of the flagged text with `word`
    pub fn matches_word(&self, word: &str) -> bool {
        self.original_text.to_lowercase() == word.trim().to_lowercase()
    }
}

/// The text under `span` if it is non-empty, in bounds and on char
/// boundaries of `doc`
pub fn check_span(doc: &Document, span: Span) -> Result<&str, IssueError> {
    if span.is_empty() {
        return Err(IssueError::EmptySpan(span.start));
    }
    if span.end > doc.len() {
        return Err(IssueError::OutOfBounds {
            start: span.start,
            end: span.end,
            len: doc.len(),
        });
    }
    doc.slice(span.start, span.end)
        .ok_or(IssueError::NotCharBoundary {
            start: span.start,
            end: span.end,
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToneLabel {
    Neutral,
    Excited,
    Concerned,
    Friendly,
    Serious,
}

impl fmt::Display for ToneLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tone {
    pub label: ToneLabel,
    /// 0-100
    pub confidence: u8,
}

impl Tone {
    pub fn new(label: ToneLabel, confidence: u8) -> Self {
        Self {
            label,
            confidence: confidence.min(100),
        }
    }

    pub fn neutral() -> Self {
        Self::new(ToneLabel::Neutral, 0)
    }
}

impl Default for Tone {
    fn default() -> Self {
        Self::neutral()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadabilityLevel {
    #[serde(rename = "N/A")]
    NotApplicable,
    #[serde(rename = "Very Simple")]
    VerySimple,
    #[serde(rename = "Easy to Read")]
    EasyToRead,
    #[serde(rename = "Professional")]
    Professional,
    #[serde(rename = "Academic / Complex")]
    AcademicComplex,
}

impl ReadabilityLevel {
    /// Level for a rounded grade
    pub fn from_grade(grade: u32) -> Self {
        match grade {
            12.. => ReadabilityLevel::AcademicComplex,
            9..=11 => ReadabilityLevel::Professional,
            6..=8 => ReadabilityLevel::EasyToRead,
            _ => ReadabilityLevel::VerySimple,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReadabilityLevel::NotApplicable => "N/A",
            ReadabilityLevel::VerySimple => "Very Simple",
            ReadabilityLevel::EasyToRead => "Easy to Read",
            ReadabilityLevel::Professional => "Professional",
            ReadabilityLevel::AcademicComplex => "Academic / Complex",
        }
    }
}

impl fmt::Display for ReadabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readability {
    pub grade: u32,
    pub estimated_reading_time: String,
    pub level: ReadabilityLevel,
}

impl Default for Readability {
    fn default() -> Self {
        Self {
            grade: 0,
            estimated_reading_time: "0 min".to_string(),
            level: ReadabilityLevel::NotApplicable,
        }
    }
}

/// Score for a given number of issues: 100 minus 5 per issue, floored at 0
pub fn quality_score(issue_count: usize) -> u8 {
    100usize.saturating_sub(issue_count.saturating_mul(5)) as u8
}

/// Output of one analyzer run over exactly one document version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub issues: Vec<Issue>,
    pub score: u8,
    pub tone: Tone,
    pub word_count: usize,
    pub readability: Readability,
    pub for_doc_version: DocVersion,
    /// Unix timestamp (seconds)
    pub analyzed_at: i64,
}

impl AnalysisResult {
    /// Result with no findings for `version`, as shown before the first analysis
    pub fn empty(version: DocVersion) -> Self {
        Self {
            issues: Vec::new(),
            score: quality_score(0),
            tone: Tone::neutral(),
            word_count: 0,
            readability: Readability::default(),
            for_doc_version: version,
            analyzed_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn is_for(&self, doc: &Document) -> bool {
        self.for_doc_version == doc.version()
    }

    pub fn issue(&self, id: &str) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.id == id)
    }

    /// Issues ordered by `start`; ties keep insertion order
    pub fn issues_by_start(&self) -> Vec<&Issue> {
        let mut sorted: Vec<&Issue> = self.issues.iter().collect();
        sorted.sort_by_key(|issue| issue.span.start);
        sorted
    }

    pub fn remove_issue(&mut self, id: &str) -> Option<Issue> {
        let pos = self.issues.iter().position(|issue| issue.id == id)?;
        Some(self.issues.remove(pos))
    }

    /// Recompute `score` from the current issue count
    pub fn rescore(&mut self) {
        self.score = quality_score(self.issues.len());
    }
}
