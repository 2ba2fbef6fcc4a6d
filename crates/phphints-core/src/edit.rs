//! Byte-range source editing

use std::ops::Range;
use thiserror::Error;

/// Errors that can occur during edit application
#[derive(Error, Debug)]
pub enum EditError {
    #[error("Overlapping edits detected at offset {0}")]
    OverlappingEdits(usize),

    #[error("Edit range {start}..{end} out of bounds for source length {len}")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },

    #[error("Edit range {start}..{end} does not fall on character boundaries")]
    NotCharBoundary { start: usize, end: usize },
}

/// Represents a single text edit operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Byte range of the source to replace; empty for a pure insertion
    pub range: Range<usize>,
    /// The replacement text
    pub replacement: String,
    /// Human-readable description of the edit
    pub message: String,
}

impl Edit {
    /// Create a new edit
    pub fn new(range: Range<usize>, replacement: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
            message: message.into(),
        }
    }

    /// Insert text at a byte offset
    pub fn insert(at: usize, text: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(at..at, text, message)
    }

    /// Delete a byte range
    pub fn delete(range: Range<usize>, message: impl Into<String>) -> Self {
        Self::new(range, String::new(), message)
    }

    /// Get the byte offset where this edit starts
    pub fn start_offset(&self) -> usize {
        self.range.start
    }

    /// Get the byte offset where this edit ends
    pub fn end_offset(&self) -> usize {
        self.range.end
    }
}

/// Apply edits to source code
///
/// Edits are applied in reverse order (from end to start) to maintain
/// valid offsets throughout the process. Insertions sharing an offset are
/// applied so that they appear in the order given.
pub fn apply_edits(source: &str, edits: &[Edit]) -> Result<String, EditError> {
    if edits.is_empty() {
        return Ok(source.to_string());
    }

    // Sort edits by start position (descending) for safe replacement
    let mut sorted_edits: Vec<&Edit> = edits.iter().rev().collect();
    sorted_edits.sort_by(|a, b| b.start_offset().cmp(&a.start_offset()));

    // Validate: check for overlapping edits and bounds
    let source_len = source.len();
    let mut prev_start: Option<usize> = None;

    for edit in &sorted_edits {
        let start = edit.start_offset();
        let end = edit.end_offset();

        if end > source_len || start > end {
            return Err(EditError::RangeOutOfBounds {
                start,
                end,
                len: source_len,
            });
        }

        if !source.is_char_boundary(start) || !source.is_char_boundary(end) {
            return Err(EditError::NotCharBoundary { start, end });
        }

        if let Some(prev) = prev_start {
            if end > prev {
                return Err(EditError::OverlappingEdits(start));
            }
        }

        prev_start = Some(start);
    }

    let mut result = source.to_string();
    for edit in sorted_edits {
        result.replace_range(edit.range.clone(), &edit.replacement);
    }

    Ok(result)
}

/// Byte offset of a zero-based line and character column
///
/// Columns past the end of the line clamp to the line end; lines past the
/// end of the source clamp to the source end.
pub fn line_col_to_offset(source: &str, line: usize, col: usize) -> usize {
    let mut offset = 0;
    for (i, l) in source.split('\n').enumerate() {
        if i == line {
            let l = l.strip_suffix('\r').unwrap_or(l);
            let within = l
                .char_indices()
                .nth(col)
                .map(|(byte, _)| byte)
                .unwrap_or(l.len());
            return offset + within;
        }
        offset += l.len() + 1; // +1 for newline
    }
    source.len()
}

/// Zero-based line and character column of a byte offset
pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_replacement() {
        let source = "else if ($a) {}";
        let edit = Edit::new(0..7, "elseif", "Replace else if");

        let result = apply_edits(source, &[edit]).unwrap();
        assert_eq!(result, "elseif ($a) {}");
    }

    #[test]
    fn test_multiple_edits() {
        let source = "if(1){} if(2){}";
        let edits = vec![
            Edit::insert(2, " ", "first"),
            Edit::insert(10, " ", "second"),
        ];

        let result = apply_edits(source, &edits).unwrap();
        assert_eq!(result, "if (1){} if (2){}");
    }

    #[test]
    fn test_delete_and_insert_keep_order() {
        let source = "static public function";
        let edits = vec![
            Edit::delete(0..7, "drop static"),
            Edit::insert(14, "static ", "re-add static"),
        ];

        let result = apply_edits(source, &edits).unwrap();
        assert_eq!(result, "public static function");
    }

    #[test]
    fn test_insertions_at_same_offset_keep_given_order() {
        let source = "ab";
        let edits = vec![Edit::insert(1, "1", "one"), Edit::insert(1, "2", "two")];

        let result = apply_edits(source, &edits).unwrap();
        assert_eq!(result, "a12b");
    }

    #[test]
    fn test_empty_edits() {
        let source = "unchanged";
        let result = apply_edits(source, &[]).unwrap();
        assert_eq!(result, "unchanged");
    }

    #[test]
    fn test_out_of_bounds() {
        let source = "short";
        let edit = Edit::new(0..100, "replacement", "oob");

        let result = apply_edits(source, &[edit]);
        assert!(matches!(result, Err(EditError::RangeOutOfBounds { .. })));
    }

    #[test]
    fn test_overlapping() {
        let source = "0123456789";
        let edits = vec![Edit::delete(0..5, "a"), Edit::delete(3..8, "b")];

        let result = apply_edits(source, &edits);
        assert!(matches!(result, Err(EditError::OverlappingEdits(_))));
    }

    #[test]
    fn test_not_char_boundary() {
        let source = "ä";
        let result = apply_edits(source, &[Edit::delete(0..1, "half")]);
        assert!(matches!(result, Err(EditError::NotCharBoundary { .. })));
    }

    #[test]
    fn test_line_col_to_offset() {
        let source = "line1\nline2\nline3";
        assert_eq!(line_col_to_offset(source, 0, 0), 0);
        assert_eq!(line_col_to_offset(source, 0, 3), 3);
        assert_eq!(line_col_to_offset(source, 0, 99), 5);
        assert_eq!(line_col_to_offset(source, 1, 0), 6);
        assert_eq!(line_col_to_offset(source, 2, 0), 12);
        assert_eq!(line_col_to_offset(source, 9, 0), source.len());
    }

    #[test]
    fn test_line_col_to_offset_multibyte() {
        let source = "$ä = 1;\n$b";
        assert_eq!(line_col_to_offset(source, 0, 2), 3);
        assert_eq!(line_col_to_offset(source, 1, 1), 10);
    }

    #[test]
    fn test_offset_to_line_col() {
        let source = "line1\nline2\nline3";
        assert_eq!(offset_to_line_col(source, 0), (0, 0));
        assert_eq!(offset_to_line_col(source, 5), (0, 5));
        assert_eq!(offset_to_line_col(source, 6), (1, 0));
        assert_eq!(offset_to_line_col(source, 12), (2, 0));
    }
}
