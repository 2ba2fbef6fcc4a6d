//! phphints-core: Core abstractions shared by the phphints crates
//!
//! This crate provides:
//! - `Hint`: A single lint/style finding with position, message, color and priority
//! - `Color`: A `#RRGGBB` marker color
//! - `Edit`: A byte-range text modification, and `apply_edits()` to apply a batch
//! - `overlay`: Gutter marker geometry, tooltip lookup and highlight clamping
//! - `logging`: Optional timestamped debug log

mod edit;
mod hint;
pub mod logging;
pub mod overlay;

pub use edit::{apply_edits, line_col_to_offset, offset_to_line_col, Edit, EditError};
pub use hint::{sort_by_priority, Color, Hint, HintError};
