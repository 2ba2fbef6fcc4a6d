//! Applies repair rules for a list of hints

use phphints_core::{logging, Hint};
use serde::Serialize;

use crate::rules::{RepairError, RepairRegistry};
use crate::{Anchor, TextBuffer};

/// A hint whose rule changed the buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedRepair {
    pub rule: &'static str,
    /// Zero-based line of the hint after clamping
    pub line: usize,
    pub message: String,
}

/// Why a hint was left alone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum SkipReason {
    /// No rule recognises the message
    NoRule,
    /// The rule found nothing to change
    NotApplied(&'static str),
    /// The rule produced edits that could not be applied
    InvalidEdit(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedHint {
    pub line: usize,
    pub message: String,
    pub reason: SkipReason,
}

/// Result of one repair pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairOutcome {
    /// The repaired source
    pub source: String,
    pub applied: Vec<AppliedRepair>,
    pub skipped: Vec<SkippedHint>,
}

impl RepairOutcome {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Rewrites source text to address hints
pub struct RepairEngine {
    registry: RepairRegistry,
}

impl RepairEngine {
    /// Engine with every built-in rule
    pub fn new() -> Result<Self, RepairError> {
        Ok(Self::with_registry(RepairRegistry::new()?))
    }

    pub fn with_registry(registry: RepairRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RepairRegistry {
        &self.registry
    }

    /// Repair `source` for `hints`
    ///
    /// Hints are handled last to first. The list is sorted by priority and
    /// each tool reports in line order, so edits mostly run bottom-up and the
    /// positions of the hints still to come stay valid. Every rule's edits are
    /// applied before the next hint is clamped to the buffer.
    pub fn repair(&self, source: &str, hints: &[Hint]) -> RepairOutcome {
        let mut buffer = TextBuffer::new(source);
        let mut applied = Vec::new();
        let mut skipped = Vec::new();

        for hint in hints.iter().rev() {
            let anchor = Anchor::clamp(&buffer, hint);
            let skip = |reason: SkipReason| SkippedHint {
                line: anchor.line_begin,
                message: hint.message.clone(),
                reason,
            };

            let Some(found) = self.registry.find(&hint.message) else {
                logging::log_repair(anchor.line_begin, &hint.message, "no repair rule");
                skipped.push(skip(SkipReason::NoRule));
                continue;
            };

            let rule = found.rule.name();
            let edits = found.rule.edits(&buffer, &anchor, &found.captures);
            if edits.is_empty() {
                logging::log_repair(anchor.line_begin, &hint.message, &format!("{} not applied", rule));
                skipped.push(skip(SkipReason::NotApplied(rule)));
                continue;
            }

            match buffer.apply(&edits) {
                Ok(()) => {
                    logging::log_repair(
                        anchor.line_begin,
                        &hint.message,
                        &format!("{} applied ({} edit(s))", rule, edits.len()),
                    );
                    applied.push(AppliedRepair {
                        rule,
                        line: anchor.line_begin,
                        message: hint.message.clone(),
                    });
                }
                Err(e) => {
                    logging::log_repair(anchor.line_begin, &hint.message, &format!("{} failed: {}", rule, e));
                    skipped.push(skip(SkipReason::InvalidEdit(e.to_string())));
                }
            }
        }

        RepairOutcome {
            source: buffer.into_text(),
            applied,
            skipped,
        }
    }
}
