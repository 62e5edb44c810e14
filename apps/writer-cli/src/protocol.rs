//! JSON-lines session protocol
//!
//! Each stdin line is one [`Request`] tagged by `op`; each stdout line is one
//! [`Event`] tagged by `event`. Analyses are pushed as they are published.

use proofing_engine::RewriteMode;
use serde::{Deserialize, Serialize};
use shared_types::{AnalysisResult, DocVersion};
use writer_session::SessionStatus;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Replace the whole text
    Edit { text: String },
    /// Accept an issue's suggestion, or `replacement` if given
    Accept {
        issue_id: String,
        #[serde(default)]
        replacement: Option<String>,
    },
    /// Add a word to the dictionary, either directly or from an issue
    Learn {
        #[serde(default)]
        issue_id: Option<String>,
        #[serde(default)]
        word: Option<String>,
    },
    Forget { word: String },
    FixAll,
    Format,
    /// Replace the selection `[start, end)` with `text`
    Replace { start: usize, end: usize, text: String },
    Rewrite {
        start: usize,
        end: usize,
        mode: RewriteMode,
    },
    Synonyms { word: String },
    Status,
    Shutdown,
}

impl Request {
    pub fn op(&self) -> &'static str {
        match self {
            Request::Edit { .. } => "edit",
            Request::Accept { .. } => "accept",
            Request::Learn { .. } => "learn",
            Request::Forget { .. } => "forget",
            Request::FixAll => "fix_all",
            Request::Format => "format",
            Request::Replace { .. } => "replace",
            Request::Rewrite { .. } => "rewrite",
            Request::Synonyms { .. } => "synonyms",
            Request::Status => "status",
            Request::Shutdown => "shutdown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Request handled; carries the resulting document version
    Ack { op: String, version: DocVersion },
    /// The text changed as the result of a request
    Document { version: DocVersion, text: String },
    Analysis(AnalysisResult),
    Dictionary { word: String, added: bool },
    Synonyms { word: String, synonyms: Vec<String> },
    Status(SessionStatus),
    Error { op: String, message: String },
}

impl Event {
    pub fn error(op: impl Into<String>, message: impl ToString) -> Self {
        Event::Error {
            op: op.into(),
            message: message.to_string(),
        }
    }
}
