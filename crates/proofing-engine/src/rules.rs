//! Phrase replacement rules

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use shared_types::{IssueKind, Span};

use crate::analyzer::{Finding, IssueSource};
use crate::error::ProviderError;
use crate::patterns::{find_all_positions, phrase_regex, RuleSpec, BUILTIN_RULES};

/// User-supplied rule, as read from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub phrase: String,
    pub kind: IssueKind,
    #[serde(default)]
    pub suggestion: Option<String>,
    pub reason: String,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Rule {
    id: String,
    kind: IssueKind,
    suggestion: Option<String>,
    reason: String,
    matcher: Regex,
}

impl Rule {
    pub fn new(
        phrase: &str,
        kind: IssueKind,
        suggestion: Option<String>,
        reason: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            id: format!("{}.{}", kind, phrase.to_lowercase().replace(' ', "_")),
            kind,
            suggestion,
            reason: reason.into(),
            matcher: phrase_regex(phrase)?,
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn findings(&self, text: &str) -> impl Iterator<Item = Finding> + '_ {
        find_all_positions(&self.matcher, text)
            .into_iter()
            .map(move |(start, end)| Finding {
                span: Span::new(start, end),
                kind: self.kind,
                suggestion: self.suggestion.clone(),
                rationale: self.reason.clone(),
                rule_id: Some(self.id.clone()),
            })
    }
}

impl TryFrom<&RuleSpec> for Rule {
    type Error = regex::Error;

    fn try_from(spec: &RuleSpec) -> Result<Self, Self::Error> {
        Ok(Rule::new(
            spec.phrase,
            spec.kind,
            Some(spec.suggestion.to_string()),
            spec.reason,
        )?
        .with_id(spec.id))
    }
}

impl TryFrom<&RuleDefinition> for Rule {
    type Error = regex::Error;

    fn try_from(def: &RuleDefinition) -> Result<Self, Self::Error> {
        let rule = Rule::new(&def.phrase, def.kind, def.suggestion.clone(), &def.reason)?;
        Ok(match &def.id {
            Some(id) => rule.with_id(id),
            None => rule,
        })
    }
}

/// Ordered rule collection; findings are reported rule by rule, then by position
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let rules = BUILTIN_RULES
            .iter()
            .filter_map(|spec| match Rule::try_from(spec) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    tracing::error!(rule = spec.id, error = %e, "Built-in rule failed to compile");
                    None
                }
            })
            .collect();
        Self { rules }
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Append user rules, skipping (and logging) any that fail to compile
    pub fn extend_from_definitions(&mut self, definitions: &[RuleDefinition]) {
        for def in definitions {
            match Rule::try_from(def) {
                Ok(rule) => self.rules.push(rule),
                Err(e) => tracing::warn!(phrase = %def.phrase, error = %e, "Skipping invalid rule"),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn check_text(&self, text: &str) -> Vec<Finding> {
        self.rules.iter().flat_map(|rule| rule.findings(text)).collect()
    }
}

#[async_trait]
impl IssueSource for RuleSet {
    fn name(&self) -> &str {
        "rules"
    }

    async fn check(&self, text: &str) -> Result<Vec<Finding>, ProviderError> {
        Ok(self.check_text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_rules_find_spelling_errors() {
        let findings = RuleSet::builtin().check_text("I recieve your thier gift");
        let spans: Vec<(usize, usize, Option<&str>)> = findings
            .iter()
            .map(|f| (f.span.start, f.span.end, f.suggestion.as_deref()))
            .collect();
        // thier is listed before recieve in the rule table
        assert_eq!(
            spans,
            vec![(15, 20, Some("their")), (2, 9, Some("receive"))]
        );
        assert!(findings.iter().all(|f| f.kind == IssueKind::Spelling));
    }

    #[test]
    fn test_builtin_rules_cover_every_kind() {
        let text = "I cant say it was very good, I was literally happy.";
        let kinds: Vec<IssueKind> = RuleSet::builtin()
            .check_text(text)
            .iter()
            .map(|f| f.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                IssueKind::Clarity,
                IssueKind::Tone,
                IssueKind::Vocabulary,
                IssueKind::Grammar
            ]
        );
    }

    #[test]
    fn test_repeated_matches_are_all_reported() {
        let findings = RuleSet::builtin().check_text("Thier house and thier car");
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].span, Span::new(0, 5));
        assert_eq!(findings[1].span, Span::new(16, 21));
    }

    #[test]
    fn test_custom_definitions() {
        let mut rules = RuleSet::empty();
        rules.extend_from_definitions(&[RuleDefinition {
            phrase: "alot".to_string(),
            kind: IssueKind::Spelling,
            suggestion: Some("a lot".to_string()),
            reason: "Common misspelling".to_string(),
            id: None,
        }]);
        let findings = rules.check_text("Thanks alot");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id.as_deref(), Some("spelling.alot"));
    }

    #[tokio::test]
    async fn test_rule_set_as_issue_source() {
        let rules = RuleSet::builtin();
        let findings = rules.check("no problems here").await.unwrap();
        assert!(findings.is_empty());
    }
}
