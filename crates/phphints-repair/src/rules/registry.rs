//! Rule registry
//!
//! Rules are tried in registration order and the first one whose pattern
//! matches the message wins.

use regex::{Captures, Regex};
use std::sync::Arc;
use thiserror::Error;

use super::braces::{
    BlankLinesBeforeClassCloseRule, BraceSpacingRule, ClassBraceOnNewLineRule, NewlineAfterBraceRule,
    OpeningBraceOnNewLineRule, SpacesBeforeOpeningBraceRule,
};
use super::lines::{BlankLineAfterStatementRule, EofNewlineRule};
use super::spacing::{
    ArgumentEqualsSpacingRule, CloseParenthesisSpacingRule, DefaultValueSpacingRule, IndentationRule,
    KeywordSpacingRule, TrailingWhitespaceRule,
};
use super::syntax::{ElseIfRule, StaticAfterVisibilityRule};
use super::RepairRule;

#[derive(Error, Debug)]
pub enum RepairError {
    #[error("Invalid message pattern for rule '{rule}': {source}")]
    InvalidPattern {
        rule: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// A rule together with what its pattern captured
pub struct RuleMatch<'a, 'm> {
    pub rule: &'a dyn RepairRule,
    pub captures: Captures<'m>,
}

/// Ordered collection of repair rules with compiled patterns
pub struct RepairRegistry {
    rules: Vec<(Arc<dyn RepairRule>, Regex)>,
}

impl RepairRegistry {
    /// Registry with every built-in rule
    pub fn new() -> Result<Self, RepairError> {
        let mut registry = Self::empty();

        registry.register(Arc::new(ClassBraceOnNewLineRule))?;
        registry.register(Arc::new(OpeningBraceOnNewLineRule))?;
        registry.register(Arc::new(KeywordSpacingRule))?;
        registry.register(Arc::new(IndentationRule))?;
        registry.register(Arc::new(BraceSpacingRule))?;
        registry.register(Arc::new(EofNewlineRule))?;
        registry.register(Arc::new(NewlineAfterBraceRule))?;
        registry.register(Arc::new(CloseParenthesisSpacingRule))?;
        registry.register(Arc::new(DefaultValueSpacingRule))?;
        registry.register(Arc::new(ArgumentEqualsSpacingRule))?;
        registry.register(Arc::new(SpacesBeforeOpeningBraceRule))?;
        registry.register(Arc::new(BlankLineAfterStatementRule))?;
        registry.register(Arc::new(BlankLinesBeforeClassCloseRule))?;
        registry.register(Arc::new(ElseIfRule))?;
        registry.register(Arc::new(StaticAfterVisibilityRule))?;
        registry.register(Arc::new(TrailingWhitespaceRule))?;

        Ok(registry)
    }

    /// Registry without any rules
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule; it is tried after every rule registered before it
    pub fn register(&mut self, rule: Arc<dyn RepairRule>) -> Result<(), RepairError> {
        let pattern = Regex::new(&format!("^(?:{})", rule.pattern())).map_err(|source| {
            RepairError::InvalidPattern {
                rule: rule.name(),
                source,
            }
        })?;
        self.rules.push((rule, pattern));
        Ok(())
    }

    /// First rule whose pattern matches `message`
    pub fn find<'m>(&self, message: &'m str) -> Option<RuleMatch<'_, 'm>> {
        self.rules.iter().find_map(|(rule, pattern)| {
            pattern.captures(message).map(|captures| RuleMatch {
                rule: rule.as_ref(),
                captures,
            })
        })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|(rule, _)| rule.name()).collect()
    }

    /// `(name, description)` of every rule, in the order they are tried
    pub fn list_rules(&self) -> Vec<(&'static str, &'static str)> {
        self.rules
            .iter()
            .map(|(rule, _)| (rule.name(), rule.description()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
