//! The hint record produced by every linter adapter

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while building hints
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HintError {
    #[error("Invalid color '{0}', expected #RRGGBB")]
    InvalidColor(String),
}

/// An opaque RGB marker color, written as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parse a `#RRGGBB` string
    pub fn from_hex(hex: &str) -> Result<Self, HintError> {
        let invalid = || HintError::InvalidColor(hex.to_string());

        let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
        };

        Ok(Self {
            red: channel(0..2)?,
            green: channel(2..4)?,
            blue: channel(4..6)?,
        })
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }

    /// Channels scaled into `0.0..=1.0`, as drawing APIs expect them
    pub fn rgb_f64(&self) -> (f64, f64, f64) {
        (
            f64::from(self.red) / 255.0,
            f64::from(self.green) / 255.0,
            f64::from(self.blue) / 255.0,
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl FromStr for Color {
    type Err = HintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = HintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// A single finding reported by a linter adapter
///
/// Lines and columns are zero-based. `column_end` is exclusive for the
/// parser adapter and inclusive-ish for the others; consumers clamp it
/// against the actual line length anyway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub line_begin: usize,
    pub line_end: usize,
    pub column_begin: usize,
    pub column_end: usize,
    pub message: String,
    pub color: Color,
    /// Lower values sort first
    pub priority: i32,
    /// Name of the adapter that produced this hint
    #[serde(default)]
    pub source: String,
}

impl Hint {
    pub fn new(
        (line_begin, line_end): (usize, usize),
        (column_begin, column_end): (usize, usize),
        message: impl Into<String>,
        color: Color,
        priority: i32,
    ) -> Self {
        Self {
            line_begin,
            line_end,
            column_begin,
            column_end,
            message: message.into(),
            color,
            priority,
            source: String::new(),
        }
    }

    /// Tag the hint with the adapter that produced it
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Whether the zero-based position falls inside this hint's range
    pub fn covers(&self, line: usize, column: usize) -> bool {
        (self.line_begin..=self.line_end).contains(&line)
            && (self.column_begin..=self.column_end).contains(&column)
    }
}

/// Stable sort by priority; hints with equal priority keep their order
pub fn sort_by_priority(hints: &mut [Hint]) {
    hints.sort_by_key(|hint| hint.priority);
}
