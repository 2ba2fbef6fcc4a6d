//! Line/column addressed text, and hint ranges clamped to it

use phphints_core::{apply_edits, line_col_to_offset, Edit, EditError, Hint};
use std::ops::Range;

/// Owned source text addressed by zero-based line and character column
///
/// Offsets handed out and accepted by this type are byte offsets into
/// [`TextBuffer::text`]. A buffer always has at least one line; a trailing
/// newline starts an empty last line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Byte offset of a line and column, clamped to the line and the buffer
    pub fn offset(&self, line: usize, column: usize) -> usize {
        line_col_to_offset(&self.text, line, column)
    }

    pub fn line_start(&self, line: usize) -> usize {
        self.offset(line, 0)
    }

    /// Offset just before the line break (or `\r\n`) ending `line`
    pub fn line_end(&self, line: usize) -> usize {
        self.offset(line, usize::MAX)
    }

    /// Content of `line` without its line break
    pub fn line_text(&self, line: usize) -> &str {
        &self.text[self.line_start(line)..self.line_end(line)]
    }

    /// Length of `line` in characters
    pub fn line_len(&self, line: usize) -> usize {
        self.line_text(line).chars().count()
    }

    pub fn is_blank(&self, line: usize) -> bool {
        self.line_text(line).trim().is_empty()
    }

    /// Width of the leading whitespace of `line`, in characters
    pub fn indentation(&self, line: usize) -> usize {
        self.line_text(line).chars().take_while(|c| c.is_whitespace()).count()
    }

    /// Offset `count` characters after `from`, stopping at the buffer end
    pub fn advance(&self, from: usize, count: usize) -> usize {
        self.text[from..]
            .char_indices()
            .nth(count)
            .map_or(self.text.len(), |(i, _)| from + i)
    }

    /// Start of the identifier that `at` points into, or `at` itself
    pub fn word_start(&self, at: usize) -> usize {
        let is_word = |c: char| c.is_alphanumeric() || c == '_';
        if !self.text[at..].chars().next().is_some_and(is_word) {
            return at;
        }
        self.text[..at]
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_word(*c))
            .last()
            .map_or(at, |(i, _)| i)
    }

    /// First occurrence of `needle` starting at or after `from`
    pub fn forward_search(&self, from: usize, needle: &str) -> Option<Range<usize>> {
        let start = from + self.text.get(from..)?.find(needle)?;
        Some(start..start + needle.len())
    }

    /// Like [`forward_search`](Self::forward_search), ignoring ASCII case
    pub fn forward_search_ci(&self, from: usize, needle: &str) -> Option<Range<usize>> {
        let haystack = self.text.get(from..)?.to_ascii_lowercase();
        let start = from + haystack.find(&needle.to_ascii_lowercase())?;
        Some(start..start + needle.len())
    }

    /// Last occurrence of `needle` ending at or before `before`
    pub fn backward_search(&self, before: usize, needle: &str) -> Option<Range<usize>> {
        let start = self.text.get(..before)?.rfind(needle)?;
        Some(start..start + needle.len())
    }

    pub fn insert(&mut self, at: usize, text: &str) -> Result<(), EditError> {
        self.apply(&[Edit::insert(at, text, "insert")])
    }

    pub fn delete(&mut self, range: Range<usize>) -> Result<(), EditError> {
        self.apply(&[Edit::delete(range, "delete")])
    }

    /// Apply a batch of non-overlapping edits; on error the buffer is unchanged
    pub fn apply(&mut self, edits: &[Edit]) -> Result<(), EditError> {
        self.text = apply_edits(&self.text, edits)?;
        Ok(())
    }
}

/// A hint's range clamped to the current buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub line_begin: usize,
    pub line_end: usize,
    pub column_begin: usize,
    pub column_end: usize,
    /// Byte offset of (`line_begin`, `column_begin`)
    pub begin: usize,
    /// Byte offset of (`line_end`, `column_end`)
    pub end: usize,
    /// Leading whitespace of `line_begin`, as spaces
    pub indent: String,
}

impl Anchor {
    /// Clamp `hint` to `buffer`
    ///
    /// Lines are clamped to the last line. A column past the end of its line
    /// moves to the line's last character.
    pub fn clamp(buffer: &TextBuffer, hint: &Hint) -> Self {
        let last_line = buffer.line_count() - 1;
        let line_begin = hint.line_begin.min(last_line);
        let line_end = hint.line_end.min(last_line);

        let clamp_column = |line: usize, column: usize| {
            let len = buffer.line_len(line);
            if column > len {
                len.saturating_sub(1)
            } else {
                column
            }
        };
        let column_begin = clamp_column(line_begin, hint.column_begin);
        let column_end = clamp_column(line_end, hint.column_end);

        Self {
            line_begin,
            line_end,
            column_begin,
            column_end,
            begin: buffer.offset(line_begin, column_begin),
            end: buffer.offset(line_end, column_end),
            indent: " ".repeat(buffer.indentation(line_begin)),
        }
    }
}
