//! Accepting a single published issue

use shared_types::{AnalysisResult, Dictionary, Document};

use crate::apply::{apply_single, PatchOutcome};
use crate::error::PatchError;

/// What the user chose to do with an issue
#[derive(Debug)]
pub enum Acceptance<'a> {
    /// Replace the flagged text
    Replace(String),
    /// Keep the text and remember the word
    AddToDictionary(&'a mut Dictionary),
}

/// Resolve `issue_id` from `result` and apply the acceptance.
///
/// A replacement produces the next document version and drops the accepted
/// issue. Adding to the dictionary keeps the document as is and drops every
/// issue flagging the same word.
pub fn accept_and_remove(
    doc: &Document,
    result: &AnalysisResult,
    issue_id: &str,
    acceptance: Acceptance<'_>,
) -> Result<PatchOutcome, PatchError> {
    let issue = result
        .issue(issue_id)
        .ok_or_else(|| PatchError::UnknownIssue(issue_id.to_string()))?;

    match acceptance {
        Acceptance::Replace(replacement) => {
            let outcome = apply_single(doc, issue, &replacement)?;
            let remaining = result
                .issues
                .iter()
                .filter(|other| other.id != issue_id)
                .cloned()
                .collect();
            Ok(PatchOutcome::new(outcome.document, remaining, 1))
        }
        Acceptance::AddToDictionary(dictionary) => {
            let word = issue.original_text.clone();
            dictionary.add(&word);
            let remaining: Vec<_> = result
                .issues
                .iter()
                .filter(|other| !other.matches_word(&word))
                .cloned()
                .collect();
            tracing::info!(
                word = %word,
                removed = result.issues.len() - remaining.len(),
                "Added word to dictionary"
            );
            Ok(PatchOutcome::new(doc.clone(), remaining, 0))
        }
    }
}
