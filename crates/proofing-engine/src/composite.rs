//! Composition of remote and local providers
//!
//! Each remote provider call is bounded by a timeout. Any failure degrades
//! to the local engine instead of surfacing an error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shared_types::{AnalysisResult, Document, Tone};

use crate::analyzer::{build_result, Analyzer, Finding, IssueSource, ToneClassifier};
use crate::error::ProviderError;
use crate::ProofingEngine;

pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 5000;

pub struct CompositeAnalyzer {
    issues: Option<Arc<dyn IssueSource>>,
    tone: Option<Arc<dyn ToneClassifier>>,
    local: ProofingEngine,
    timeout_ms: u64,
}

impl CompositeAnalyzer {
    /// Composite with no remote providers: behaves exactly like `local`
    pub fn new(local: ProofingEngine) -> Self {
        Self {
            issues: None,
            tone: None,
            local,
            timeout_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
        }
    }

    pub fn with_issue_source(mut self, source: Arc<dyn IssueSource>) -> Self {
        self.issues = Some(source);
        self
    }

    pub fn with_tone_classifier(mut self, classifier: Arc<dyn ToneClassifier>) -> Self {
        self.tone = Some(classifier);
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn bounded<T, F>(&self, provider: &str, call: F) -> Result<T, ProviderError>
    where
        F: std::future::Future<Output = Result<T, ProviderError>>,
    {
        match tokio::time::timeout(Duration::from_millis(self.timeout_ms), call).await {
            Ok(result) => result,
            Err(_elapsed) => {
                tracing::debug!(provider, timeout_ms = self.timeout_ms, "Provider timed out");
                Err(ProviderError::Timeout(self.timeout_ms))
            }
        }
    }

    async fn findings(&self, text: &str) -> Vec<Finding> {
        let Some(source) = &self.issues else {
            return self.local.check_text(text);
        };
        match self.bounded(source.name(), source.check(text)).await {
            Ok(findings) => findings,
            Err(e) => {
                tracing::warn!(
                    provider = source.name(),
                    error = %e,
                    "Issue provider unavailable, using local rules"
                );
                self.local.check_text(text)
            }
        }
    }

    async fn tone(&self, text: &str) -> Tone {
        let Some(classifier) = &self.tone else {
            return self.local.classify_tone(text);
        };
        match self.bounded(classifier.name(), classifier.classify(text)).await {
            Ok(tone) => tone,
            Err(e) => {
                tracing::warn!(
                    provider = classifier.name(),
                    error = %e,
                    "Tone classifier unavailable, using keyword fallback"
                );
                self.local.classify_tone(text)
            }
        }
    }
}

#[async_trait]
impl Analyzer for CompositeAnalyzer {
    fn name(&self) -> &str {
        "composite"
    }

    async fn analyze(&self, doc: &Document) -> Result<AnalysisResult, ProviderError> {
        let (findings, tone) = tokio::join!(self.findings(doc.text()), self.tone(doc.text()));
        tracing::debug!(
            version = %doc.version(),
            findings = findings.len(),
            tone = %tone.label,
            "Analysis complete"
        );
        Ok(build_result(doc, findings, tone))
    }
}
