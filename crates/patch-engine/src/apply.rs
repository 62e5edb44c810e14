//! Splicing corrections into a document
//!
//! Every function here is pure: it reads one document snapshot and returns
//! the successor, or an error with the input untouched.

use serde::{Deserialize, Serialize};
use shared_types::{check_span, Document, Issue, Span};

use crate::error::PatchError;

/// Result of a successful patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchOutcome {
    pub document: Document,
    /// Issues still worth showing; their spans refer to the pre-patch version
    pub remaining_issues: Vec<Issue>,
    /// Substitutions actually made
    pub applied: usize,
}

impl PatchOutcome {
    pub fn new(document: Document, remaining_issues: Vec<Issue>, applied: usize) -> Self {
        Self {
            document,
            remaining_issues,
            applied,
        }
    }
}

/// Replace one issue's span with `replacement`.
///
/// Fails with `StaleSpan` unless `doc[start..end]` still equals the issue's
/// original text.
pub fn apply_single(
    doc: &Document,
    issue: &Issue,
    replacement: &str,
) -> Result<PatchOutcome, PatchError> {
    issue
        .validate_against(doc)
        .map_err(|source| PatchError::StaleSpan {
            span: issue.span,
            issue_version: issue.source_doc_version,
            doc_version: doc.version(),
            source,
        })?;

    let text = splice(doc.text(), issue.span, replacement);
    tracing::debug!(
        issue = %issue.id,
        from = %doc.version(),
        "Applied suggestion"
    );
    Ok(PatchOutcome::new(doc.next(text), Vec::new(), 1))
}

/// Apply every suggestion in one left-to-right pass ("fix all").
///
/// Issues are stably sorted by `start`. An issue starting before the end of
/// the previous one is skipped, as is one whose span is not valid for `doc`.
/// Drifted issues and issues without a suggestion copy their span through
/// unchanged. The outcome carries no remaining issues. When nothing was
/// substituted the outcome holds `doc` itself, version included.
pub fn apply_batch(doc: &Document, issues: &[Issue]) -> PatchOutcome {
    let mut sorted: Vec<&Issue> = issues.iter().collect();
    sorted.sort_by_key(|issue| issue.span.start);

    let text = doc.text();
    let mut out = String::with_capacity(text.len());
    let mut last_index = 0;
    let mut applied = 0usize;
    let mut skipped = 0usize;

    for issue in sorted {
        let Span { start, end } = issue.span;
        if start < last_index {
            skipped += 1;
            continue;
        }
        let Some(current) = doc.slice(start, end).filter(|_| start < end) else {
            skipped += 1;
            continue;
        };

        out.push_str(&text[last_index..start]);
        match &issue.suggestion {
            Some(suggestion) if current == issue.original_text => {
                out.push_str(suggestion);
                applied += 1;
            }
            _ => out.push_str(current),
        }
        last_index = end;
    }
    out.push_str(&text[last_index..]);

    tracing::info!(
        from = %doc.version(),
        applied,
        skipped,
        "Applied batch fix"
    );
    if applied == 0 {
        return PatchOutcome::new(doc.clone(), Vec::new(), 0);
    }
    PatchOutcome::new(doc.next(out), Vec::new(), applied)
}

/// Replace a user selection with `replacement`
pub fn apply_selection(
    doc: &Document,
    span: Span,
    replacement: &str,
) -> Result<PatchOutcome, PatchError> {
    check_span(doc, span).map_err(|source| PatchError::InvalidSpan { span, source })?;
    let text = splice(doc.text(), span, replacement);
    Ok(PatchOutcome::new(doc.next(text), Vec::new(), 1))
}

fn splice(text: &str, span: Span, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..span.start]);
    out.push_str(replacement);
    out.push_str(&text[span.end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shared_types::{DocVersion, IssueError, IssueKind};

    fn issue(doc: &Document, start: usize, end: usize, suggestion: Option<&str>) -> Issue {
        Issue::from_document(
            doc,
            IssueKind::Spelling,
            Span::new(start, end),
            suggestion.map(String::from),
            "test",
        )
        .unwrap()
    }

    #[test]
    fn test_apply_single_splices() {
        let doc = Document::new("I recieve your thier gift");
        let fix = issue(&doc, 2, 9, Some("receive"));
        let outcome = apply_single(&doc, &fix, "receive").unwrap();
        assert_eq!(outcome.document.text(), "I receive your thier gift");
        assert_eq!(outcome.document.version(), DocVersion(1));
    }

    #[test]
    fn test_apply_single_rejects_drift() {
        let doc = Document::new("I recieve your thier gift");
        let fix = issue(&doc, 15, 20, Some("their"));
        let edited = doc.next("Now I recieve your thier gift");

        let err = apply_single(&edited, &fix, "their").unwrap_err();
        assert!(matches!(err, PatchError::StaleSpan { .. }));
        assert_eq!(edited.text(), "Now I recieve your thier gift");
    }

    #[test]
    fn test_batch_example() {
        let doc = Document::new("I recieve your thier gift");
        let issues = vec![
            issue(&doc, 15, 20, Some("their")),
            issue(&doc, 2, 9, Some("receive")),
        ];
        let outcome = apply_batch(&doc, &issues);
        assert_eq!(outcome.document.text(), "I receive your their gift");
        assert_eq!(outcome.applied, 2);
        assert!(outcome.remaining_issues.is_empty());
    }

    #[test]
    fn test_batch_drops_overlap() {
        let doc = Document::new("abcdefghij");
        let issues = vec![issue(&doc, 2, 6, Some("X")), issue(&doc, 4, 8, Some("Y"))];
        let outcome = apply_batch(&doc, &issues);
        assert_eq!(outcome.document.text(), "abXghij");
        assert_eq!(outcome.applied, 1);
    }

    #[test]
    fn test_batch_copies_drifted_and_unsuggested_spans() {
        let original = Document::new("one two three");
        let drifted = issue(&original, 4, 7, Some("2"));
        let no_fix = issue(&original, 0, 3, None);
        let good = issue(&original, 8, 13, Some("3"));

        let doc = original.next("one TWO three");
        let outcome = apply_batch(&doc, &[good, drifted, no_fix]);
        assert_eq!(outcome.document.text(), "one TWO 3");
        assert_eq!(outcome.applied, 1);
    }

    #[test]
    fn test_batch_skips_out_of_bounds_without_advancing() {
        let original = Document::new("hello wrold and more");
        let far = issue(&original, 16, 20, Some("MORE"));
        let fix = issue(&original, 6, 11, Some("world"));

        let doc = original.next("hello wrold");
        let outcome = apply_batch(&doc, &[far, fix]);
        assert_eq!(outcome.document.text(), "hello world");
    }

    #[test]
    fn test_empty_batch_is_identity() {
        let doc = Document::new("nothing to do");
        let outcome = apply_batch(&doc, &[]);
        assert_eq!(outcome.document, doc);
        assert_eq!(outcome.applied, 0);
    }

    #[test]
    fn test_batch_with_only_drifted_issues_keeps_version() {
        let original = Document::new("one two");
        let drifted = issue(&original, 4, 7, Some("2"));
        let doc = original.next("one TWO");

        let outcome = apply_batch(&doc, &[drifted]);
        assert_eq!(outcome.document, doc);
        assert_eq!(outcome.document.version(), DocVersion(1));
        assert_eq!(outcome.applied, 0);
    }

    #[test]
    fn test_apply_selection() {
        let doc = Document::new("I can't go");
        let outcome = apply_selection(&doc, Span::new(2, 7), "cannot").unwrap();
        assert_eq!(outcome.document.text(), "I cannot go");

        let err = apply_selection(&doc, Span::new(5, 50), "x").unwrap_err();
        assert!(matches!(err, PatchError::InvalidSpan { .. }));
    }

    #[test]
    fn test_selection_rejects_split_characters() {
        let doc = Document::new("café");
        let err = apply_selection(&doc, Span::new(0, 4), "x").unwrap_err();
        assert!(matches!(
            err,
            PatchError::InvalidSpan {
                source: IssueError::NotCharBoundary { start: 0, end: 4 },
                ..
            }
        ));
    }
}
