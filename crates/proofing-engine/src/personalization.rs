//! Personal dictionary filtering and storage
//!
//! Issues whose flagged text is in the user's dictionary are hidden. The
//! filter itself is pure; stores own the dictionary and persist it.

use std::fs;
use std::path::{Path, PathBuf};

use shared_types::{AnalysisResult, Dictionary, Issue};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Drop issues whose original text is a dictionary word, keeping order
pub fn filter_issues(issues: Vec<Issue>, dictionary: &Dictionary) -> Vec<Issue> {
    if dictionary.is_empty() {
        return issues;
    }
    issues
        .into_iter()
        .filter(|issue| !dictionary.contains(&issue.original_text))
        .collect()
}

/// Filter a result's issues and recompute its score
pub fn apply_to_result(mut result: AnalysisResult, dictionary: &Dictionary) -> AnalysisResult {
    let before = result.issues.len();
    result.issues = filter_issues(std::mem::take(&mut result.issues), dictionary);
    if result.issues.len() != before {
        tracing::debug!(
            removed = before - result.issues.len(),
            "Personal dictionary suppressed issues"
        );
        result.rescore();
    }
    result
}

/// Read/write access to the user's dictionary
pub trait DictionaryStore: Send + Sync {
    fn get(&self) -> Result<Dictionary, DictionaryError>;

    /// Returns `true` if the word was newly added
    fn add(&mut self, word: &str) -> Result<bool, DictionaryError>;

    /// Returns `true` if the word was present
    fn remove(&mut self, word: &str) -> Result<bool, DictionaryError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDictionaryStore {
    dictionary: Dictionary,
}

impl MemoryDictionaryStore {
    pub fn new(dictionary: Dictionary) -> Self {
        Self { dictionary }
    }
}

impl DictionaryStore for MemoryDictionaryStore {
    fn get(&self) -> Result<Dictionary, DictionaryError> {
        Ok(self.dictionary.clone())
    }

    fn add(&mut self, word: &str) -> Result<bool, DictionaryError> {
        Ok(self.dictionary.add(word))
    }

    fn remove(&mut self, word: &str) -> Result<bool, DictionaryError> {
        Ok(self.dictionary.remove(word))
    }
}

/// Dictionary persisted as a JSON array of words
#[derive(Debug, Clone)]
pub struct JsonDictionaryStore {
    path: PathBuf,
    dictionary: Dictionary,
}

impl JsonDictionaryStore {
    /// Open the store at `path`; a missing file is an empty dictionary
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DictionaryError> {
        let path = path.into();
        let dictionary = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let words: Vec<String> = serde_json::from_str(&content)?;
            words.iter().collect()
        } else {
            Dictionary::new()
        };
        tracing::info!(path = %path.display(), words = dictionary.len(), "Loaded dictionary");
        Ok(Self { path, dictionary })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `dictionary` to disk; the in-memory copy is only replaced
    /// once the write succeeded
    fn save(&mut self, dictionary: Dictionary) -> Result<(), DictionaryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&dictionary)?;
        fs::write(&self.path, json)?;
        self.dictionary = dictionary;
        Ok(())
    }
}

impl DictionaryStore for JsonDictionaryStore {
    fn get(&self) -> Result<Dictionary, DictionaryError> {
        Ok(self.dictionary.clone())
    }

    fn add(&mut self, word: &str) -> Result<bool, DictionaryError> {
        let mut updated = self.dictionary.clone();
        let added = updated.add(word);
        if added {
            self.save(updated)?;
        }
        Ok(added)
    }

    fn remove(&mut self, word: &str) -> Result<bool, DictionaryError> {
        let mut updated = self.dictionary.clone();
        let removed = updated.remove(word);
        if removed {
            self.save(updated)?;
        }
        Ok(removed)
    }
}
