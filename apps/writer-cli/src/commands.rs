//! One-shot commands over a whole file

use std::path::{Path, PathBuf};

use anyhow::Context;
use patch_engine::apply_batch;
use proofing_engine::personalization::apply_to_result;
use proofing_engine::{Analyzer, Formatter};
use serde::Serialize;
use shared_types::{AnalysisResult, Dictionary, Document};
use writer_session::SessionConfig;

/// Load the config file if given, then apply command-line overrides
pub fn load_config(
    path: Option<&Path>,
    dictionary: Option<PathBuf>,
    languagetool: bool,
) -> anyhow::Result<SessionConfig> {
    let mut config = match path {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };
    if dictionary.is_some() {
        config.dictionary.path = dictionary;
    }
    if languagetool {
        config.providers.use_languagetool = true;
    }
    Ok(config)
}

/// Analyze `text` once and hide dictionary words
pub async fn check(
    text: &str,
    analyzer: &dyn Analyzer,
    dictionary: &Dictionary,
) -> anyhow::Result<AnalysisResult> {
    let doc = Document::new(text);
    let result = analyzer
        .analyze(&doc)
        .await
        .with_context(|| format!("Analyzer '{}' failed", analyzer.name()))?;
    Ok(apply_to_result(result, dictionary))
}

#[derive(Debug, Clone, Serialize)]
pub struct FixReport {
    pub text: String,
    pub fixed: usize,
    pub score_before: u8,
}

/// Analyze `text` and apply every suggestion
pub async fn fix(
    text: &str,
    analyzer: &dyn Analyzer,
    dictionary: &Dictionary,
) -> anyhow::Result<FixReport> {
    let result = check(text, analyzer, dictionary).await?;
    let doc = Document::with_version(text, result.for_doc_version);
    let outcome = apply_batch(&doc, &result.issues);
    Ok(FixReport {
        text: outcome.document.text().to_string(),
        fixed: outcome.applied,
        score_before: result.score,
    })
}

pub async fn format(text: &str, formatter: &dyn Formatter) -> anyhow::Result<String> {
    formatter
        .format(text)
        .await
        .with_context(|| format!("Formatter '{}' failed", formatter.name()))
}

/// Write to `output`, or stdout when unset
pub fn emit(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
