//! User exception dictionary
//!
//! Words are stored lower-cased and trimmed. Analysis only ever reads the
//! dictionary; it changes through explicit `add` / `remove` calls.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionary {
    words: BTreeSet<String>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(word: &str) -> String {
        word.trim().to_lowercase()
    }

    /// Insert a word; returns `false` if it was blank or already present
    pub fn add(&mut self, word: &str) -> bool {
        let word = Self::normalize(word);
        if word.is_empty() {
            return false;
        }
        self.words.insert(word)
    }

    pub fn remove(&mut self, word: &str) -> bool {
        self.words.remove(&Self::normalize(word))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&Self::normalize(word))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for Dictionary {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut dictionary = Dictionary::new();
        for word in iter {
            dictionary.add(word.as_ref());
        }
        dictionary
    }
}
