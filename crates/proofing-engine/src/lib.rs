pub mod analyzer;
pub mod composite;
pub mod error;
pub mod formatter;
pub mod languagetool;
pub mod patterns;
pub mod personalization;
pub mod readability;
pub mod rewrite;
pub mod rules;
pub mod tone;

use async_trait::async_trait;
use shared_types::{AnalysisResult, Document, Tone};

pub use analyzer::{build_result, Analyzer, Finding, IssueSource, ToneClassifier};
pub use composite::CompositeAnalyzer;
pub use error::ProviderError;
pub use formatter::{Formatter, RuleFormatter};
pub use languagetool::LanguageToolSource;
pub use personalization::{
    DictionaryError, DictionaryStore, JsonDictionaryStore, MemoryDictionaryStore,
};
pub use rewrite::RewriteMode;
pub use rules::{Rule, RuleDefinition, RuleSet};
pub use tone::KeywordToneClassifier;

/// Local heuristic analyzer: rule table, keyword tone and readability.
///
/// Runs entirely in-process and never fails, which makes it the fallback for
/// every remote provider.
#[derive(Debug, Clone)]
pub struct ProofingEngine {
    rules: RuleSet,
    tone: KeywordToneClassifier,
}

impl ProofingEngine {
    pub fn new() -> Self {
        Self::with_rules(RuleSet::builtin())
    }

    pub fn with_rules(rules: RuleSet) -> Self {
        Self {
            rules,
            tone: KeywordToneClassifier::new(),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn check_text(&self, text: &str) -> Vec<Finding> {
        self.rules.check_text(text)
    }

    pub fn classify_tone(&self, text: &str) -> Tone {
        self.tone.classify_text(text)
    }

    pub fn analyze_document(&self, doc: &Document) -> AnalysisResult {
        build_result(doc, self.check_text(doc.text()), self.classify_tone(doc.text()))
    }
}

impl Default for ProofingEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Analyzer for ProofingEngine {
    fn name(&self) -> &str {
        "local"
    }

    async fn analyze(&self, doc: &Document) -> Result<AnalysisResult, ProviderError> {
        Ok(self.analyze_document(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{IssueKind, ReadabilityLevel, ToneLabel};

    #[test]
    fn test_engine_detects_example_issues() {
        let engine = ProofingEngine::new();
        let doc = Document::new("I recieve your thier gift");
        let result = engine.analyze_document(&doc);

        let mut found: Vec<(usize, &str, Option<&str>)> = result
            .issues
            .iter()
            .map(|i| (i.span.start, i.original_text.as_str(), i.suggestion.as_deref()))
            .collect();
        found.sort();
        assert_eq!(
            found,
            vec![(2, "recieve", Some("receive")), (15, "thier", Some("their"))]
        );
        assert_eq!(result.score, 90);
        assert_eq!(result.word_count, 5);
    }

    #[test]
    fn test_engine_accepts_clean_text() {
        let engine = ProofingEngine::new();
        let doc = Document::new("The cat sat.");
        let result = engine.analyze_document(&doc);

        assert!(result.issues.is_empty());
        assert_eq!(result.score, 100);
        assert_eq!(result.tone.label, ToneLabel::Neutral);
        assert_eq!(result.readability.level, ReadabilityLevel::VerySimple);
    }

    #[test]
    fn test_engine_issue_kinds() {
        let engine = ProofingEngine::new();
        let doc = Document::new("I cant wait");
        let result = engine.analyze_document(&doc);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].kind, IssueKind::Grammar);
        assert_eq!(result.issues[0].suggestion.as_deref(), Some("can't"));
    }

    #[tokio::test]
    async fn test_engine_as_analyzer() {
        let engine = ProofingEngine::new();
        let doc = Document::new("literally").next("literally happy");
        let result = engine.analyze(&doc).await.unwrap();
        assert!(result.is_for(&doc));
        assert_eq!(result.issues.len(), 2);
    }
}
