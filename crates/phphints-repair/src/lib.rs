//! phphints-repair: Source rewrites for PHP_CodeSniffer hints
//!
//! Sixteen PHP_CodeSniffer messages are recognised, from brace placement to
//! trailing whitespace. For each hint the [`RepairEngine`] finds the first
//! [`RepairRule`](rules::RepairRule) whose pattern matches the message,
//! clamps the hint's range to the current text and applies the rule's edits.
//!
//! # Example
//!
//! ```ignore
//! use phphints_repair::RepairEngine;
//!
//! let engine = RepairEngine::new()?;
//! let outcome = engine.repair(&source, &report.hints);
//! if outcome.changed() {
//!     std::fs::write(path, &outcome.source)?;
//! }
//! ```

mod buffer;
mod engine;
pub mod rules;

pub use buffer::{Anchor, TextBuffer};
pub use engine::{AppliedRepair, RepairEngine, RepairOutcome, SkipReason, SkippedHint};
pub use rules::{RepairError, RepairRegistry, RepairRule};
