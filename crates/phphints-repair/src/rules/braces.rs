//! Brace placement and spacing around braces

use phphints_core::Edit;
use regex::Captures;

use super::{adjust_spaces, exact, number, set_whitespace, whitespace_before, RepairRule};
use crate::{Anchor, TextBuffer};

fn brace(captures: &Captures, group: usize) -> &'static str {
    match captures.get(group).map(|m| m.as_str()) {
        Some("opening") => "{",
        _ => "}",
    }
}

/// Moves a class's opening brace to its own line
pub struct ClassBraceOnNewLineRule;

impl RepairRule for ClassBraceOnNewLineRule {
    fn name(&self) -> &'static str {
        "class_brace_on_new_line"
    }

    fn description(&self) -> &'static str {
        "Put the opening brace of a class on the line after the definition"
    }

    fn pattern(&self) -> String {
        exact("Opening brace of a class must be on the line after the definition")
    }

    fn edits(&self, buffer: &TextBuffer, anchor: &Anchor, _captures: &Captures) -> Vec<Edit> {
        buffer
            .forward_search(anchor.begin, "{")
            .map(|found| Edit::insert(found.start, "\n", self.description()))
            .into_iter()
            .collect()
    }
}

/// Moves an opening brace to a new line, keeping the statement's indentation
pub struct OpeningBraceOnNewLineRule;

impl RepairRule for OpeningBraceOnNewLineRule {
    fn name(&self) -> &'static str {
        "opening_brace_on_new_line"
    }

    fn description(&self) -> &'static str {
        "Put the opening brace on a new line"
    }

    fn pattern(&self) -> String {
        exact("Opening brace should be on a new line")
    }

    fn edits(&self, buffer: &TextBuffer, anchor: &Anchor, _captures: &Captures) -> Vec<Edit> {
        buffer
            .forward_search(anchor.begin, "{")
            .map(|found| Edit::insert(found.start, format!("\n{}", anchor.indent), self.description()))
            .into_iter()
            .collect()
    }
}

/// Spaces after the brace that ends at the hint
pub struct BraceSpacingRule;

impl RepairRule for BraceSpacingRule {
    fn name(&self) -> &'static str {
        "brace_spacing"
    }

    fn description(&self) -> &'static str {
        "Fix the number of spaces after a brace"
    }

    fn pattern(&self) -> String {
        r"Expected (\d+) spaces? after (opening|closing) brace; (\d+) found".to_string()
    }

    fn edits(&self, buffer: &TextBuffer, anchor: &Anchor, captures: &Captures) -> Vec<Edit> {
        let (Some(expected), Some(actual)) = (number(captures, 1), number(captures, 3)) else {
            return Vec::new();
        };

        buffer
            .backward_search(anchor.end, brace(captures, 2))
            .and_then(|found| adjust_spaces(buffer, found.end, expected, actual, self.description()))
            .into_iter()
            .collect()
    }
}

/// Line breaks after the brace that ends at the hint
///
/// Surplus line breaks are only removed together with the whitespace around
/// them; code is never deleted.
pub struct NewlineAfterBraceRule;

impl RepairRule for NewlineAfterBraceRule {
    fn name(&self) -> &'static str {
        "newline_after_brace"
    }

    fn description(&self) -> &'static str {
        "Fix the number of line breaks after a brace"
    }

    fn pattern(&self) -> String {
        r"Expected (\d+) newlines? after (opening|closing) brace; (\d+) found".to_string()
    }

    fn edits(&self, buffer: &TextBuffer, anchor: &Anchor, captures: &Captures) -> Vec<Edit> {
        let (Some(expected), Some(actual)) = (number(captures, 1), number(captures, 3)) else {
            return Vec::new();
        };
        let Some(found) = buffer.backward_search(anchor.end, brace(captures, 2)) else {
            return Vec::new();
        };
        let at = found.end;

        if expected > actual {
            return vec![Edit::insert(at, "\n".repeat(expected - actual), self.description())];
        }

        let mut surplus = actual - expected;
        let mut end = at;
        for (i, c) in buffer.text()[at..].char_indices() {
            if surplus == 0 || !c.is_whitespace() {
                break;
            }
            if c == '\n' {
                surplus -= 1;
                end = at + i + 1;
            }
        }

        if end > at {
            vec![Edit::delete(at..end, self.description())]
        } else {
            Vec::new()
        }
    }
}

/// Spaces between a statement and its opening brace
pub struct SpacesBeforeOpeningBraceRule;

impl RepairRule for SpacesBeforeOpeningBraceRule {
    fn name(&self) -> &'static str {
        "spaces_before_opening_brace"
    }

    fn description(&self) -> &'static str {
        "Fix the number of spaces before an opening brace"
    }

    fn pattern(&self) -> String {
        r"Expected (\d+) spaces? before opening brace; (\d+) found".to_string()
    }

    fn edits(&self, buffer: &TextBuffer, anchor: &Anchor, captures: &Captures) -> Vec<Edit> {
        let Some(expected) = number(captures, 1) else {
            return Vec::new();
        };
        let Some(found) = buffer.forward_search(anchor.begin, "{") else {
            return Vec::new();
        };
        if found.start > buffer.line_end(anchor.line_begin) {
            return Vec::new();
        }

        let start = found.start - whitespace_before(buffer, found.start);
        set_whitespace(buffer, start..found.start, expected, self.description())
            .into_iter()
            .collect()
    }
}

/// Removes blank lines between a class body and its closing brace
pub struct BlankLinesBeforeClassCloseRule;

impl RepairRule for BlankLinesBeforeClassCloseRule {
    fn name(&self) -> &'static str {
        "blank_lines_before_class_close"
    }

    fn description(&self) -> &'static str {
        "Remove blank lines above the closing brace of a class"
    }

    fn pattern(&self) -> String {
        exact("The closing brace for the class must go on the next line after the body")
    }

    fn edits(&self, buffer: &TextBuffer, anchor: &Anchor, _captures: &Captures) -> Vec<Edit> {
        let mut first_blank = anchor.line_begin;
        while first_blank > 0 && buffer.is_blank(first_blank - 1) {
            first_blank -= 1;
        }

        if first_blank == anchor.line_begin {
            return Vec::new();
        }

        vec![Edit::delete(
            buffer.line_start(first_blank)..buffer.line_start(anchor.line_begin),
            self.description(),
        )]
    }
}
