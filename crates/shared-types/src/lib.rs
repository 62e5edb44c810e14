pub mod dictionary;
pub mod document;
pub mod types;

pub use dictionary::Dictionary;
pub use document::{DocVersion, Document};
pub use types::{
    check_span, quality_score, AnalysisResult, Issue, IssueError, IssueKind, Readability, ReadabilityLevel,
    Span, Tone, ToneLabel,
};
