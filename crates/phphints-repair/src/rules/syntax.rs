//! Token rewrites

use phphints_core::Edit;
use regex::Captures;
use std::ops::Range;

use super::{exact, RepairRule};
use crate::{Anchor, TextBuffer};

/// `needle` at the hint, or else its next occurrence on the hinted line
fn locate(buffer: &TextBuffer, anchor: &Anchor, needle: &str) -> Option<Range<usize>> {
    let found = buffer.forward_search_ci(buffer.word_start(anchor.begin), needle)?;
    (found.end <= buffer.line_end(anchor.line_begin)).then_some(found)
}

/// `else if` → `elseif`
pub struct ElseIfRule;

impl RepairRule for ElseIfRule {
    fn name(&self) -> &'static str {
        "else_if"
    }

    fn description(&self) -> &'static str {
        "Replace ELSE IF with ELSEIF"
    }

    fn pattern(&self) -> String {
        exact("Usage of ELSE IF is discouraged; use ELSEIF instead")
    }

    fn edits(&self, buffer: &TextBuffer, anchor: &Anchor, _captures: &Captures) -> Vec<Edit> {
        locate(buffer, anchor, "else if")
            .map(|found| Edit::new(found, "elseif", self.description()))
            .into_iter()
            .collect()
    }
}

/// `static public function` → `public static function`
pub struct StaticAfterVisibilityRule;

impl RepairRule for StaticAfterVisibilityRule {
    fn name(&self) -> &'static str {
        "static_after_visibility"
    }

    fn description(&self) -> &'static str {
        "Move the static keyword after the visibility"
    }

    fn pattern(&self) -> String {
        exact("The static declaration must come after the visibility declaration")
    }

    fn edits(&self, buffer: &TextBuffer, anchor: &Anchor, _captures: &Captures) -> Vec<Edit> {
        let Some(keyword) = locate(buffer, anchor, "static ") else {
            return Vec::new();
        };
        // the word after `static ` is the visibility; re-insert behind it
        let Some(space) = buffer.forward_search(keyword.end, " ") else {
            return Vec::new();
        };

        let moved = buffer.text()[keyword.clone()].to_string();
        vec![
            Edit::delete(keyword, self.description()),
            Edit::insert(space.end, moved, self.description()),
        ]
    }
}
