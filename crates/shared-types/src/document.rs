//! Versioned document snapshots
//!
//! A `Document` is immutable once created. Every accepted edit produces a
//! successor through [`Document::next`], which bumps the version by one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic document version
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DocVersion(pub u64);

impl DocVersion {
    pub fn next(self) -> Self {
        DocVersion(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    text: String,
    version: DocVersion,
}

impl Document {
    /// Create the first version of a document
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_version(text, DocVersion::default())
    }

    /// Create a document at an explicit version (for snapshots received from an editor)
    pub fn with_version(text: impl Into<String>, version: DocVersion) -> Self {
        Self {
            text: text.into(),
            version,
        }
    }

    /// Successor document carrying `text` at the next version
    pub fn next(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            version: self.version.next(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn version(&self) -> DocVersion {
        self.version
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Slice `[start, end)`; `None` when out of bounds or not on a char boundary
    pub fn slice(&self, start: usize, end: usize) -> Option<&str> {
        if start > end {
            return None;
        }
        self.text.get(start..end)
    }

    /// Whitespace-delimited, non-empty token count
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
