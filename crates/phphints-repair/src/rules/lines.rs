//! Vertical whitespace

use phphints_core::Edit;
use regex::Captures;

use super::{number, RepairRule};
use crate::{Anchor, TextBuffer};

/// Number of line breaks at the end of the file
pub struct EofNewlineRule;

impl RepairRule for EofNewlineRule {
    fn name(&self) -> &'static str {
        "eof_newline"
    }

    fn description(&self) -> &'static str {
        "End the file with the expected number of line breaks"
    }

    fn pattern(&self) -> String {
        r"Expected (\d+) newlines? at end of file; (\d+) found".to_string()
    }

    fn edits(&self, buffer: &TextBuffer, _anchor: &Anchor, captures: &Captures) -> Vec<Edit> {
        let Some(expected) = number(captures, 1) else {
            return Vec::new();
        };

        let text = buffer.text();
        let content_end = text.trim_end_matches(['\n', '\r']).len();
        let wanted = "\n".repeat(expected);
        if text[content_end..] == wanted {
            return Vec::new();
        }

        vec![Edit::new(content_end..text.len(), wanted, self.description())]
    }
}

/// Exactly one blank line after the hinted line (`use` blocks and similar)
pub struct BlankLineAfterStatementRule;

impl RepairRule for BlankLineAfterStatementRule {
    fn name(&self) -> &'static str {
        "blank_line_after_statement"
    }

    fn description(&self) -> &'static str {
        "Leave one blank line after the last statement of a block"
    }

    fn pattern(&self) -> String {
        r"There must be one blank line after the last ([A-Z_]+) statement; (\d+) found;".to_string()
    }

    fn edits(&self, buffer: &TextBuffer, anchor: &Anchor, _captures: &Captures) -> Vec<Edit> {
        let first = anchor.line_begin + 1;
        let line_count = buffer.line_count();

        let mut next_code = first;
        while next_code < line_count && buffer.is_blank(next_code) {
            next_code += 1;
        }
        // nothing follows the statement
        if first >= line_count || next_code >= line_count {
            return Vec::new();
        }

        let range = buffer.line_start(first)..buffer.line_start(next_code);
        if &buffer.text()[range.clone()] == "\n" {
            return Vec::new();
        }

        vec![Edit::new(range, "\n", self.description())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::repair;

    const EOF_MESSAGE: &str = "Expected 1 newline at end of file; 0 found";

    #[test]
    fn test_eof_newline_added() {
        let result = repair(&EofNewlineRule, "<?php\necho 1;", EOF_MESSAGE, 1, (6, 7));
        assert_eq!(result, "<?php\necho 1;\n");
    }

    #[test]
    fn test_eof_newlines_collapsed() {
        let result = repair(
            &EofNewlineRule,
            "<?php\necho 1;\n\r\n\n",
            "Expected 1 newline at end of file; 3 found",
            3,
            (0, 1),
        );
        assert_eq!(result, "<?php\necho 1;\n");
    }

    #[test]
    fn test_eof_already_correct() {
        let source = "<?php\necho 1;\n";
        assert_eq!(repair(&EofNewlineRule, source, EOF_MESSAGE, 1, (0, 1)), source);
    }

    #[test]
    fn test_blank_line_inserted_after_use() {
        let result = repair(
            &BlankLineAfterStatementRule,
            "<?php\nnamespace App;\n\nuse Foo\\Bar;\nclass Baz\n{\n}\n",
            "There must be one blank line after the last USE statement; 0 found;",
            3,
            (0, 1),
        );
        assert_eq!(result, "<?php\nnamespace App;\n\nuse Foo\\Bar;\n\nclass Baz\n{\n}\n");
    }

    #[test]
    fn test_extra_blank_lines_collapsed() {
        let result = repair(
            &BlankLineAfterStatementRule,
            "<?php\nuse Foo\\Bar;\n\n   \n\nclass Baz\n{\n}\n",
            "There must be one blank line after the last USE statement; 3 found;",
            1,
            (0, 1),
        );
        assert_eq!(result, "<?php\nuse Foo\\Bar;\n\nclass Baz\n{\n}\n");
    }

    #[test]
    fn test_blank_line_at_end_of_file_is_left_alone() {
        let source = "<?php\nuse Foo\\Bar;\n";
        let result = repair(
            &BlankLineAfterStatementRule,
            source,
            "There must be one blank line after the last USE statement; 0 found;",
            1,
            (0, 1),
        );
        assert_eq!(result, source);
    }
}
