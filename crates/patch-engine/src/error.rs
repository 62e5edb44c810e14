use shared_types::{DocVersion, IssueError, Span};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// The issue's text no longer sits at its span
    #[error("Stale span {span:?} (issue from {issue_version}, document at {doc_version}): {source}")]
    StaleSpan {
        span: Span,
        issue_version: DocVersion,
        doc_version: DocVersion,
        source: IssueError,
    },

    #[error("Invalid span {span:?}: {source}")]
    InvalidSpan { span: Span, source: IssueError },

    #[error("Unknown issue: {0}")]
    UnknownIssue(String),
}
