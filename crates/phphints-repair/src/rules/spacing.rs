//! Horizontal whitespace: keywords, indentation, argument defaults

use phphints_core::Edit;
use regex::Captures;

use super::{adjust_spaces, exact, find_variable, number, set_whitespace, whitespace_after, RepairRule};
use crate::{Anchor, TextBuffer};

/// Spaces after a control keyword (`if(` → `if (`)
pub struct KeywordSpacingRule;

impl RepairRule for KeywordSpacingRule {
    fn name(&self) -> &'static str {
        "keyword_spacing"
    }

    fn description(&self) -> &'static str {
        "Fix the number of spaces after a keyword"
    }

    fn pattern(&self) -> String {
        r"Expected (\d+) spaces? after ([A-Z_]+) keyword; (\d+) found".to_string()
    }

    fn edits(&self, buffer: &TextBuffer, anchor: &Anchor, captures: &Captures) -> Vec<Edit> {
        let (Some(expected), Some(actual)) = (number(captures, 1), number(captures, 3)) else {
            return Vec::new();
        };

        // the reported column may point inside the keyword
        buffer
            .forward_search_ci(buffer.word_start(anchor.begin), &captures[2])
            .and_then(|found| adjust_spaces(buffer, found.end, expected, actual, self.description()))
            .into_iter()
            .collect()
    }
}

/// Leading whitespace of a line
pub struct IndentationRule;

impl RepairRule for IndentationRule {
    fn name(&self) -> &'static str {
        "indentation"
    }

    fn description(&self) -> &'static str {
        "Fix the indentation of a line"
    }

    fn pattern(&self) -> String {
        r"[A-Za-z ]+ indented incorrectly; expected( at least)? (\d+) spaces, found (\d+)".to_string()
    }

    fn edits(&self, buffer: &TextBuffer, anchor: &Anchor, captures: &Captures) -> Vec<Edit> {
        let (Some(expected), Some(actual)) = (number(captures, 2), number(captures, 3)) else {
            return Vec::new();
        };

        adjust_spaces(
            buffer,
            buffer.line_start(anchor.line_begin),
            expected,
            actual,
            self.description(),
        )
        .into_iter()
        .collect()
    }
}

/// Spaces after the closing parenthesis of a control structure
pub struct CloseParenthesisSpacingRule;

impl RepairRule for CloseParenthesisSpacingRule {
    fn name(&self) -> &'static str {
        "close_parenthesis_spacing"
    }

    fn description(&self) -> &'static str {
        "Fix the number of spaces after a closing parenthesis"
    }

    fn pattern(&self) -> String {
        r"Expected (\d+) spaces? after closing parenthesis; found (\d+)".to_string()
    }

    fn edits(&self, buffer: &TextBuffer, anchor: &Anchor, captures: &Captures) -> Vec<Edit> {
        let (Some(expected), Some(actual)) = (number(captures, 1), number(captures, 2)) else {
            return Vec::new();
        };

        adjust_spaces(buffer, anchor.end, expected, actual, self.description())
            .into_iter()
            .collect()
    }
}

/// Spaces between `=` and an argument's default value
pub struct DefaultValueSpacingRule;

impl RepairRule for DefaultValueSpacingRule {
    fn name(&self) -> &'static str {
        "default_value_spacing"
    }

    fn description(&self) -> &'static str {
        "Fix the spacing between an argument's equals sign and default value"
    }

    fn pattern(&self) -> String {
        r#"Incorrect spacing between default value and equals sign for argument "(\$[A-Za-z_][A-Za-z0-9_]*)"; expected (\d+) but found (\d+)"#.to_string()
    }

    fn edits(&self, buffer: &TextBuffer, anchor: &Anchor, captures: &Captures) -> Vec<Edit> {
        let Some(expected) = number(captures, 2) else {
            return Vec::new();
        };
        let Some(variable) = find_variable(buffer, anchor.line_begin, &captures[1]) else {
            return Vec::new();
        };
        let Some(equals) = buffer.forward_search(variable.end, "=") else {
            return Vec::new();
        };
        if equals.end > buffer.line_end(anchor.line_begin) {
            return Vec::new();
        }

        let end = equals.end + whitespace_after(buffer, equals.end);
        set_whitespace(buffer, equals.end..end, expected, self.description())
            .into_iter()
            .collect()
    }
}

/// Spaces between an argument's name and its `=`
pub struct ArgumentEqualsSpacingRule;

impl RepairRule for ArgumentEqualsSpacingRule {
    fn name(&self) -> &'static str {
        "argument_equals_spacing"
    }

    fn description(&self) -> &'static str {
        "Fix the spacing between an argument and its equals sign"
    }

    fn pattern(&self) -> String {
        r#"Incorrect spacing between argument "(\$[A-Za-z_][A-Za-z0-9_]*)" and equals sign; expected (\d+) but found (\d+)"#.to_string()
    }

    fn edits(&self, buffer: &TextBuffer, anchor: &Anchor, captures: &Captures) -> Vec<Edit> {
        let Some(expected) = number(captures, 2) else {
            return Vec::new();
        };
        let Some(variable) = find_variable(buffer, anchor.line_begin, &captures[1]) else {
            return Vec::new();
        };

        let end = variable.end + whitespace_after(buffer, variable.end);
        if !buffer.text()[end..].starts_with('=') {
            return Vec::new();
        }

        set_whitespace(buffer, variable.end..end, expected, self.description())
            .into_iter()
            .collect()
    }
}

/// Trailing spaces and tabs
pub struct TrailingWhitespaceRule;

impl RepairRule for TrailingWhitespaceRule {
    fn name(&self) -> &'static str {
        "trailing_whitespace"
    }

    fn description(&self) -> &'static str {
        "Remove whitespace at the end of the line"
    }

    fn pattern(&self) -> String {
        exact("Whitespace found at end of line")
    }

    fn edits(&self, buffer: &TextBuffer, anchor: &Anchor, _captures: &Captures) -> Vec<Edit> {
        let line = buffer.line_text(anchor.line_begin);
        let kept = line.trim_end_matches([' ', '\t']).len();
        if kept == line.len() {
            return Vec::new();
        }

        let start = buffer.line_start(anchor.line_begin);
        vec![Edit::delete(start + kept..start + line.len(), self.description())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::repair;

    #[test]
    fn test_keyword_spacing_inserts() {
        let result = repair(
            &KeywordSpacingRule,
            "<?php\nif($a) {\n}\n",
            "Expected 1 space after IF keyword; 0 found",
            1,
            (1, 1),
        );
        assert_eq!(result, "<?php\nif ($a) {\n}\n");
    }

    #[test]
    fn test_keyword_spacing_deletes() {
        let result = repair(
            &KeywordSpacingRule,
            "<?php\n    foreach   ($a as $b) {\n    }\n",
            "Expected 1 space after FOREACH keyword; 3 found",
            1,
            (4, 5),
        );
        assert_eq!(result, "<?php\n    foreach ($a as $b) {\n    }\n");
    }

    #[test]
    fn test_keyword_not_found() {
        let source = "<?php\n$a = 1;\n";
        let result = repair(
            &KeywordSpacingRule,
            source,
            "Expected 1 space after WHILE keyword; 0 found",
            1,
            (1, 1),
        );
        assert_eq!(result, source);
    }

    #[test]
    fn test_indentation_increase() {
        let result = repair(
            &IndentationRule,
            "<?php\nclass Foo\n{\n  public $a;\n}\n",
            "Line indented incorrectly; expected 4 spaces, found 2",
            3,
            (1, 2),
        );
        assert_eq!(result, "<?php\nclass Foo\n{\n    public $a;\n}\n");
    }

    #[test]
    fn test_indentation_at_least() {
        let result = repair(
            &IndentationRule,
            "<?php\n          return 1;\n",
            "Line indented incorrectly; expected at least 8 spaces, found 10",
            1,
            (9, 10),
        );
        assert_eq!(result, "<?php\n        return 1;\n");
    }

    #[test]
    fn test_close_parenthesis_spacing() {
        // `if ($a){` with the `)` reported at column 7
        let result = repair(
            &CloseParenthesisSpacingRule,
            "<?php\nif ($a){\n}\n",
            "Expected 1 space after closing parenthesis; found 0",
            1,
            (6, 7),
        );
        assert_eq!(result, "<?php\nif ($a) {\n}\n");

        let result = repair(
            &CloseParenthesisSpacingRule,
            "<?php\nif ($a)   {\n}\n",
            "Expected 1 space after closing parenthesis; found 3",
            1,
            (6, 7),
        );
        assert_eq!(result, "<?php\nif ($a) {\n}\n");
    }

    #[test]
    fn test_default_value_spacing() {
        let result = repair(
            &DefaultValueSpacingRule,
            "<?php\nfunction foo($ab, $a =1) {}\n",
            "Incorrect spacing between default value and equals sign for argument \"$a\"; expected 1 but found 0",
            1,
            (18, 19),
        );
        assert_eq!(result, "<?php\nfunction foo($ab, $a = 1) {}\n");

        let result = repair(
            &DefaultValueSpacingRule,
            "<?php\nfunction foo($a =   null) {}\n",
            "Incorrect spacing between default value and equals sign for argument \"$a\"; expected 1 but found 3",
            1,
            (13, 14),
        );
        assert_eq!(result, "<?php\nfunction foo($a = null) {}\n");
    }

    #[test]
    fn test_argument_equals_spacing() {
        let result = repair(
            &ArgumentEqualsSpacingRule,
            "<?php\nfunction foo($a= 1) {}\n",
            "Incorrect spacing between argument \"$a\" and equals sign; expected 1 but found 0",
            1,
            (13, 14),
        );
        assert_eq!(result, "<?php\nfunction foo($a = 1) {}\n");
    }

    #[test]
    fn test_argument_without_equals() {
        let source = "<?php\nfunction foo($a, $b) {}\n";
        let result = repair(
            &ArgumentEqualsSpacingRule,
            source,
            "Incorrect spacing between argument \"$a\" and equals sign; expected 1 but found 0",
            1,
            (13, 14),
        );
        assert_eq!(result, source);
    }

    #[test]
    fn test_trailing_whitespace() {
        let result = repair(
            &TrailingWhitespaceRule,
            "<?php\n$a = 1; \t \n$b = 2;  \n",
            "Whitespace found at end of line",
            1,
            (8, 9),
        );
        assert_eq!(result, "<?php\n$a = 1;\n$b = 2;  \n");
    }

    #[test]
    fn test_trailing_whitespace_crlf() {
        let result = repair(
            &TrailingWhitespaceRule,
            "<?php  \r\n",
            "Whitespace found at end of line",
            0,
            (6, 7),
        );
        assert_eq!(result, "<?php\r\n");
    }
}
