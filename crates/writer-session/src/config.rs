//! Session configuration
//!
//! Loaded from a TOML file. Every section is optional and falls back to the
//! defaults below.

use anyhow::Context;
use proofing_engine::languagetool::{DEFAULT_ENDPOINT, DEFAULT_LANGUAGE};
use proofing_engine::RuleDefinition;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub dictionary: DictionaryConfig,
    /// Extra phrase rules appended to the built-in table
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl SessionConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Quiet period after the last edit before analysis starts (default: 1000)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl SchedulerConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Per-call bound on remote providers (default: 5000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub use_languagetool: bool,
    #[serde(default = "default_languagetool_url")]
    pub languagetool_url: String,
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            use_languagetool: false,
            languagetool_url: default_languagetool_url(),
            language: default_language(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_languagetool_url() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DictionaryConfig {
    /// JSON word list; in-memory only when unset
    pub path: Option<PathBuf>,
}
