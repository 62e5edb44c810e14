//! The editing session: sole owner of the document
//!
//! Every accepted change goes through [`EditingSession::commit`], which
//! produces the next version and hands it to the scheduler. Published
//! analyses come back through [`EditingSession::apply_analysis`].

use std::sync::Arc;

use patch_engine::{accept_and_remove, apply_batch, apply_selection, Acceptance, PatchError};
use proofing_engine::formatter::smart_fix;
use proofing_engine::rewrite::{self, RewriteMode};
use proofing_engine::{
    Analyzer, CompositeAnalyzer, DictionaryStore, Formatter, JsonDictionaryStore,
    LanguageToolSource, MemoryDictionaryStore, ProofingEngine, RuleFormatter, RuleSet,
};
use serde::Serialize;
use shared_types::{check_span, AnalysisResult, Dictionary, DocVersion, Document, Issue, Span};
use tokio::sync::broadcast;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::scheduler::AnalysisScheduler;

/// Analyzer described by `config`: local rules, plus LanguageTool when enabled
pub fn analyzer_from_config(config: &SessionConfig) -> Result<Arc<dyn Analyzer>, SessionError> {
    let mut rules = RuleSet::builtin();
    rules.extend_from_definitions(&config.rules);
    let local = ProofingEngine::with_rules(rules);

    let mut analyzer = CompositeAnalyzer::new(local).with_timeout(config.providers.timeout_ms);
    if config.providers.use_languagetool {
        let source = LanguageToolSource::new(
            &config.providers.languagetool_url,
            &config.providers.language,
            config.providers.timeout_ms,
        )?;
        tracing::info!(endpoint = source.endpoint(), "Using LanguageTool");
        analyzer = analyzer.with_issue_source(Arc::new(source));
    }
    Ok(Arc::new(analyzer))
}

/// JSON store at the configured path, otherwise an in-memory one
pub fn dictionary_store_from_config(
    config: &SessionConfig,
) -> Result<Box<dyn DictionaryStore>, SessionError> {
    Ok(match &config.dictionary.path {
        Some(path) => Box::new(JsonDictionaryStore::open(path)?),
        None => Box::new(MemoryDictionaryStore::default()),
    })
}

/// Snapshot reported to front-ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub version: DocVersion,
    pub busy: bool,
    pub words: usize,
    pub issues: usize,
    pub score: Option<u8>,
    pub dictionary: usize,
}

pub struct EditingSession {
    document: Document,
    analysis: Option<AnalysisResult>,
    dictionary: Dictionary,
    store: Box<dyn DictionaryStore>,
    formatter: Arc<dyn Formatter>,
    scheduler: AnalysisScheduler,
}

impl EditingSession {
    /// Start a session on `text`; the first analysis is scheduled immediately
    pub fn new(
        text: impl Into<String>,
        scheduler: AnalysisScheduler,
        store: Box<dyn DictionaryStore>,
    ) -> Result<Self, SessionError> {
        let dictionary = store.get()?;
        scheduler.set_dictionary(dictionary.clone());

        let session = Self {
            document: Document::new(text),
            analysis: None,
            dictionary,
            store,
            formatter: Arc::new(RuleFormatter),
            scheduler,
        };
        session.request_analysis();
        Ok(session)
    }

    /// Build the analyzer, scheduler and dictionary store from `config`
    pub fn from_config(config: &SessionConfig, text: impl Into<String>) -> Result<Self, SessionError> {
        let analyzer = analyzer_from_config(config)?;
        let scheduler = AnalysisScheduler::spawn(analyzer, config.scheduler.debounce());
        let store = dictionary_store_from_config(config)?;
        Self::new(text, scheduler, store)
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn issues(&self) -> &[Issue] {
        self.analysis
            .as_ref()
            .map(|analysis| analysis.issues.as_slice())
            .unwrap_or_default()
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<AnalysisResult>> {
        self.scheduler.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.scheduler.is_busy()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            version: self.document.version(),
            busy: self.is_busy(),
            words: self.document.word_count(),
            issues: self.issues().len(),
            score: self.analysis.as_ref().map(|analysis| analysis.score),
            dictionary: self.dictionary.len(),
        }
    }

    /// Replace the whole text (typed input)
    pub fn edit(&mut self, text: impl Into<String>) -> DocVersion {
        let next = self.document.next(text);
        self.commit(next);
        self.document.version()
    }

    /// Take a published result; only one for the current version is accepted
    pub fn apply_analysis(&mut self, result: &AnalysisResult) -> bool {
        if !result.is_for(&self.document) {
            tracing::debug!(
                version = %result.for_doc_version,
                current = %self.document.version(),
                "Ignoring analysis for another version"
            );
            return false;
        }
        let result = proofing_engine::personalization::apply_to_result(
            result.clone(),
            &self.dictionary,
        );
        self.analysis = Some(result);
        true
    }

    /// Accept one issue, using its suggestion unless `replacement` is given.
    ///
    /// A stale span leaves the document as is and schedules a fresh analysis.
    pub fn accept(
        &mut self,
        issue_id: &str,
        replacement: Option<String>,
    ) -> Result<DocVersion, SessionError> {
        let analysis = self
            .analysis
            .as_mut()
            .ok_or_else(|| PatchError::UnknownIssue(issue_id.to_string()))?;
        let replacement = match replacement {
            Some(replacement) => replacement,
            None => analysis
                .issue(issue_id)
                .ok_or_else(|| PatchError::UnknownIssue(issue_id.to_string()))?
                .suggestion
                .clone()
                .ok_or_else(|| SessionError::NoSuggestion(issue_id.to_string()))?,
        };

        match accept_and_remove(
            &self.document,
            analysis,
            issue_id,
            Acceptance::Replace(replacement),
        ) {
            Ok(outcome) => {
                analysis.issues = outcome.remaining_issues;
                analysis.rescore();
                self.commit(outcome.document);
                Ok(self.document.version())
            }
            Err(e @ PatchError::StaleSpan { .. }) => {
                tracing::warn!(issue = issue_id, error = %e, "Suggestion no longer applies");
                self.request_analysis();
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Keep an issue's text and add it to the dictionary; returns the word.
    ///
    /// Nothing changes in the session unless the store accepted the word.
    pub fn learn(&mut self, issue_id: &str) -> Result<String, SessionError> {
        let analysis = self
            .analysis
            .as_mut()
            .ok_or_else(|| PatchError::UnknownIssue(issue_id.to_string()))?;
        let word = analysis
            .issue(issue_id)
            .map(|issue| issue.original_text.clone())
            .ok_or_else(|| PatchError::UnknownIssue(issue_id.to_string()))?;

        self.store.add(&word)?;
        let outcome = accept_and_remove(
            &self.document,
            analysis,
            issue_id,
            Acceptance::AddToDictionary(&mut self.dictionary),
        )?;
        analysis.issues = outcome.remaining_issues;
        analysis.rescore();

        self.scheduler.set_dictionary(self.dictionary.clone());
        Ok(word)
    }

    /// Add `word` and hide every current issue flagging it
    pub fn add_to_dictionary(&mut self, word: &str) -> Result<bool, SessionError> {
        let added = self.store.add(word)?;
        self.dictionary = self.store.get()?;
        self.scheduler.set_dictionary(self.dictionary.clone());
        if let Some(analysis) = self.analysis.as_mut() {
            analysis.issues.retain(|issue| !issue.matches_word(word));
            analysis.rescore();
        }
        Ok(added)
    }

    /// Remove `word`; the text is re-analyzed so it can be flagged again
    pub fn remove_from_dictionary(&mut self, word: &str) -> Result<bool, SessionError> {
        let removed = self.store.remove(word)?;
        if removed {
            self.dictionary = self.store.get()?;
            self.scheduler.set_dictionary(self.dictionary.clone());
            self.request_analysis();
        }
        Ok(removed)
    }

    /// Apply every current suggestion in one patch
    pub fn fix_all(&mut self) -> DocVersion {
        let issues = match &self.analysis {
            Some(analysis) if !analysis.issues.is_empty() => analysis.issues.clone(),
            _ => return self.document.version(),
        };

        let guard = self.scheduler.lock_bulk_edit();
        let outcome = apply_batch(&self.document, &issues);
        if outcome.applied > 0 {
            self.commit(outcome.document);
        } else {
            // Every issue had drifted; refresh them
            self.request_analysis();
        }
        self.clear_issues();
        drop(guard);

        self.document.version()
    }

    /// Run the formatter over the whole document.
    ///
    /// Falls back to the rule formatter when the configured one fails or
    /// returns less than half of the text.
    pub async fn auto_format(&mut self) -> DocVersion {
        let guard = self.scheduler.lock_bulk_edit();
        let text = self.document.text();
        let formatted = match self.formatter.format(text).await {
            Ok(formatted) if formatted.chars().count() * 2 < text.chars().count() => {
                tracing::warn!(
                    formatter = self.formatter.name(),
                    "Formatter dropped too much text, using rule fallback"
                );
                smart_fix(text)
            }
            Ok(formatted) => formatted,
            Err(e) => {
                tracing::warn!(
                    formatter = self.formatter.name(),
                    error = %e,
                    "Formatter unavailable, using rule fallback"
                );
                smart_fix(text)
            }
        };

        if formatted != self.document.text() {
            let next = self.document.next(formatted);
            self.commit(next);
            self.clear_issues();
        }
        drop(guard);

        self.document.version()
    }

    pub fn replace_selection(
        &mut self,
        span: Span,
        replacement: &str,
    ) -> Result<DocVersion, SessionError> {
        let outcome = apply_selection(&self.document, span, replacement)?;
        self.commit(outcome.document);
        Ok(self.document.version())
    }

    pub fn rewrite_selection(
        &mut self,
        span: Span,
        mode: RewriteMode,
    ) -> Result<DocVersion, SessionError> {
        let selected = check_span(&self.document, span)
            .map_err(|source| PatchError::InvalidSpan { span, source })?;
        let rewritten = rewrite::rewrite(selected, mode);
        self.replace_selection(span, &rewritten)
    }

    pub fn synonyms(&self, word: &str) -> &'static [&'static str] {
        rewrite::synonyms(word)
    }

    /// Ask the scheduler to analyze the current version again
    pub fn request_analysis(&self) {
        self.scheduler.on_document_changed(&self.document);
    }

    pub async fn shutdown(self) {
        self.scheduler.shutdown().await;
    }

    fn commit(&mut self, document: Document) {
        tracing::debug!(from = %self.document.version(), to = %document.version(), "Document changed");
        self.document = document;
        self.scheduler.on_document_changed(&self.document);
    }

    fn clear_issues(&mut self) {
        if let Some(analysis) = self.analysis.as_mut() {
            analysis.issues.clear();
            analysis.rescore();
        }
    }
}
