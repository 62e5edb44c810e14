//! Provider traits and the assembly of an `AnalysisResult`
//!
//! Analysis is split into two pluggable capabilities: an [`IssueSource`]
//! that reports spans, and a [`ToneClassifier`]. An [`Analyzer`] combines
//! them for one document snapshot and tags everything with its version.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{quality_score, AnalysisResult, Document, Issue, IssueKind, Span, Tone};

use crate::error::ProviderError;
use crate::readability;

/// A provider-reported problem before it is bound to a document version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub span: Span,
    pub kind: IssueKind,
    pub suggestion: Option<String>,
    pub rationale: String,
    pub rule_id: Option<String>,
}

#[async_trait]
pub trait IssueSource: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self, text: &str) -> Result<Vec<Finding>, ProviderError>;
}

#[async_trait]
pub trait ToneClassifier: Send + Sync {
    fn name(&self) -> &str;

    async fn classify(&self, text: &str) -> Result<Tone, ProviderError>;
}

/// Produces an `AnalysisResult` for one document snapshot.
///
/// Implementations must not mutate anything observable and must tag the
/// result with `doc.version()`.
#[async_trait]
pub trait Analyzer: Send + Sync {
    fn name(&self) -> &str;

    async fn analyze(&self, doc: &Document) -> Result<AnalysisResult, ProviderError>;
}

/// Bind findings to `doc` and compute the document statistics.
///
/// Findings whose span does not hold against `doc` are dropped.
pub fn build_result(doc: &Document, findings: Vec<Finding>, tone: Tone) -> AnalysisResult {
    let mut issues = Vec::with_capacity(findings.len());
    for finding in findings {
        match Issue::from_document(
            doc,
            finding.kind,
            finding.span,
            finding.suggestion,
            finding.rationale,
        ) {
            Ok(issue) => issues.push(match finding.rule_id {
                Some(rule_id) => issue.with_rule_id(rule_id),
                None => issue,
            }),
            Err(e) => {
                tracing::warn!(version = %doc.version(), error = %e, "Dropping invalid finding");
            }
        }
    }

    AnalysisResult {
        score: quality_score(issues.len()),
        issues,
        tone,
        word_count: doc.word_count(),
        readability: readability::calculate(doc.text()),
        for_doc_version: doc.version(),
        analyzed_at: chrono::Utc::now().timestamp(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{DocVersion, ToneLabel};

    fn finding(start: usize, end: usize, suggestion: &str) -> Finding {
        Finding {
            span: Span::new(start, end),
            kind: IssueKind::Spelling,
            suggestion: Some(suggestion.to_string()),
            rationale: "Spelling error".to_string(),
            rule_id: Some("test".to_string()),
        }
    }

    #[test]
    fn test_build_result_tags_version_and_counts() {
        let doc = Document::with_version("I recieve your thier gift", DocVersion(4));
        let result = build_result(
            &doc,
            vec![finding(2, 9, "receive"), finding(15, 20, "their")],
            Tone::new(ToneLabel::Friendly, 70),
        );

        assert_eq!(result.for_doc_version, DocVersion(4));
        assert_eq!(result.word_count, 5);
        assert_eq!(result.score, 90);
        assert_eq!(result.issues.len(), 2);
        assert!(result
            .issues
            .iter()
            .all(|issue| issue.source_doc_version == DocVersion(4)));
        assert_eq!(result.issues[0].original_text, "recieve");
        assert_eq!(result.issues[1].rule_id.as_deref(), Some("test"));
    }

    #[test]
    fn test_build_result_drops_invalid_spans() {
        let doc = Document::new("short");
        let result = build_result(
            &doc,
            vec![finding(0, 5, "x"), finding(3, 50, "y"), finding(2, 2, "z")],
            Tone::neutral(),
        );
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.score, 95);
    }
}
