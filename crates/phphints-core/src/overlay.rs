//! Geometry and lookups behind the editor overlay
//!
//! An editor shows hints in three ways: a colored marker strip along the
//! right edge of the view, an underline over the hinted text, and a tooltip
//! listing every hint under the pointer. The functions here compute those
//! from a hint list; drawing is left to the host.

use crate::Hint;

/// Width of a gutter marker in pixels
pub const MARKER_WIDTH: u32 = 3;

/// Smallest marker height so single-line hints stay visible
pub const MIN_MARKER_HEIGHT: u32 = 10;

/// A marker rectangle, measured from the top of the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub top: u32,
    pub height: u32,
    pub width: u32,
}

/// Place a hint's marker on a view `view_height` pixels tall
///
/// The marker spans the hint's lines scaled to the view height.
pub fn marker_geometry(hint: &Hint, line_count: usize, view_height: u32) -> Marker {
    let line_count = line_count.max(1) as f64;
    let view_height = f64::from(view_height);

    let top = (hint.line_begin as f64 * view_height / line_count) as u32;
    let bottom = ((hint.line_end + 1) as f64 * view_height / line_count) as u32;

    Marker {
        top,
        height: bottom.saturating_sub(top).max(MIN_MARKER_HEIGHT),
        width: MARKER_WIDTH,
    }
}

/// Messages of every hint covering a position, in list order
pub fn hints_at(hints: &[Hint], line: usize, column: usize) -> Vec<&str> {
    hints
        .iter()
        .filter(|hint| hint.covers(line, column))
        .map(|hint| hint.message.as_str())
        .collect()
}

/// Tooltip text for a position, or `None` when nothing is hinted there
pub fn tooltip_at(hints: &[Hint], line: usize, column: usize) -> Option<String> {
    let messages = hints_at(hints, line, column);
    if messages.is_empty() {
        None
    } else {
        Some(messages.join("\n"))
    }
}

/// A highlight range in zero-based line/column coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagRange {
    pub start: (usize, usize),
    pub end: (usize, usize),
}

/// Clamp a hint to the text so it can be underlined
///
/// `line_lengths` holds the character count of every line. A column that
/// does not fit its line snaps to the line end; lines past the end snap to
/// the last line.
pub fn tag_range(line_lengths: &[usize], hint: &Hint) -> TagRange {
    let last_line = line_lengths.len().saturating_sub(1);
    let clamp = |line: usize, column: usize| {
        let line = line.min(last_line);
        let length = line_lengths.get(line).copied().unwrap_or(0);
        let column = if length > column { column } else { length };
        (line, column)
    };

    TagRange {
        start: clamp(hint.line_begin, hint.column_begin),
        end: clamp(hint.line_end, hint.column_end),
    }
}
