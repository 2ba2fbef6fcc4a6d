//! Repair rules
//!
//! Each rule recognises one PHP_CodeSniffer message and computes the edits
//! that address it. Rules never touch the buffer themselves; the engine
//! applies what they return.

mod braces;
mod lines;
mod registry;
mod spacing;
mod syntax;

pub use braces::{
    BlankLinesBeforeClassCloseRule, BraceSpacingRule, ClassBraceOnNewLineRule, NewlineAfterBraceRule,
    OpeningBraceOnNewLineRule, SpacesBeforeOpeningBraceRule,
};
pub use lines::{BlankLineAfterStatementRule, EofNewlineRule};
pub use registry::{RepairError, RepairRegistry, RuleMatch};
pub use spacing::{
    ArgumentEqualsSpacingRule, CloseParenthesisSpacingRule, DefaultValueSpacingRule, IndentationRule,
    KeywordSpacingRule, TrailingWhitespaceRule,
};
pub use syntax::{ElseIfRule, StaticAfterVisibilityRule};

use phphints_core::Edit;
use regex::Captures;

use crate::{Anchor, TextBuffer};

/// A fix for one kind of hint message
pub trait RepairRule: Send + Sync {
    /// Internal name for this rule
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Regex matched against the start of the message
    fn pattern(&self) -> String;

    /// Edits that address the hint; empty when the rule finds nothing to do
    fn edits(&self, buffer: &TextBuffer, anchor: &Anchor, captures: &Captures) -> Vec<Edit>;
}

/// Pattern for a message that must match exactly
pub(crate) fn exact(message: &str) -> String {
    format!("{}$", regex::escape(message))
}

/// Numeric capture group
pub(crate) fn number(captures: &Captures, group: usize) -> Option<usize> {
    captures.get(group)?.as_str().parse().ok()
}

/// Turn `actual` characters at `at` into `expected` spaces
///
/// Missing spaces are inserted at `at`; surplus characters after `at` are
/// deleted.
pub(crate) fn adjust_spaces(
    buffer: &TextBuffer,
    at: usize,
    expected: usize,
    actual: usize,
    message: &str,
) -> Option<Edit> {
    if expected > actual {
        Some(Edit::insert(at, " ".repeat(expected - actual), message))
    } else if actual > expected {
        let end = buffer.advance(at, actual - expected);
        (end > at).then(|| Edit::delete(at..end, message))
    } else {
        None
    }
}

/// Replace the run of spaces and tabs in `range` with exactly `count` spaces
pub(crate) fn set_whitespace(buffer: &TextBuffer, range: std::ops::Range<usize>, count: usize, message: &str) -> Option<Edit> {
    let wanted = " ".repeat(count);
    (buffer.text()[range.clone()] != wanted).then(|| Edit::new(range, wanted, message))
}

/// Length of the run of spaces and tabs starting at `from`
pub(crate) fn whitespace_after(buffer: &TextBuffer, from: usize) -> usize {
    buffer.text()[from..]
        .bytes()
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count()
}

/// Length of the run of spaces and tabs ending at `before`
pub(crate) fn whitespace_before(buffer: &TextBuffer, before: usize) -> usize {
    buffer.text()[..before]
        .bytes()
        .rev()
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count()
}

/// Byte range of the PHP variable `name` (including `$`) on `line`
///
/// `$a` does not match the start of `$abc`.
pub(crate) fn find_variable(buffer: &TextBuffer, line: usize, name: &str) -> Option<std::ops::Range<usize>> {
    let line_end = buffer.line_end(line);
    let mut from = buffer.line_start(line);

    while let Some(found) = buffer.forward_search(from, name) {
        if found.end > line_end {
            return None;
        }
        let continues = buffer.text()[found.end..]
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_');
        if !continues {
            return Some(found);
        }
        from = found.end;
    }

    None
}

#[cfg(test)]
pub(crate) mod testing {
    use super::RepairRule;
    use crate::{Anchor, TextBuffer};
    use phphints_core::{apply_edits, Color, Hint};
    use regex::Regex;

    /// Run `rule` for `message` at the given zero-based position
    pub fn repair(rule: &dyn RepairRule, source: &str, message: &str, line: usize, columns: (usize, usize)) -> String {
        let buffer = TextBuffer::new(source);
        let hint = Hint::new((line, line), columns, message, Color::new(0xA5, 0xA5, 0xA5), 100);
        let anchor = Anchor::clamp(&buffer, &hint);

        let pattern = Regex::new(&format!("^(?:{})", rule.pattern())).unwrap();
        let captures = pattern.captures(message).unwrap();

        apply_edits(source, &rule.edits(&buffer, &anchor, &captures)).unwrap()
    }
}
