//! Adapter trait and the process plumbing shared by all adapters

mod phpcs;
mod phplint;
mod phpmd;

pub use phpcs::PhpCs;
pub use phplint::PhpLint;
pub use phpmd::PhpMd;

use phphints_core::{logging, Color, Hint};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

use crate::RegistryError;

/// Error type for adapter runs
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {adapter} output: {message}")]
    Parse { adapter: &'static str, message: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Locations of the external programs
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolPaths {
    /// PHP interpreter used to run the parser script
    pub php: String,
    /// `php-parse.php` from nikic/PHP-Parser; when unset the `php-parse`
    /// executable is run directly
    pub php_parser: Option<PathBuf>,
    pub phpmd: String,
    pub phpcs: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            php: "php".to_string(),
            php_parser: None,
            phpmd: "phpmd".to_string(),
            phpcs: "phpcs".to_string(),
        }
    }
}

/// A linter wrapped so that its findings come back as hints
///
/// Implementations launch their tool once per call, block until it exits
/// and never fail the whole lint pass: the caller treats an error as "no
/// hints from this adapter".
pub trait Adapter: Send + Sync {
    /// Short name used in configuration (`phplint`, `phpmd`, `phpcs`)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Marker color of this adapter's hints
    fn color(&self) -> Color;

    /// Sort priority of this adapter's hints (lower sorts first)
    fn priority(&self) -> i32;

    /// The executable this adapter launches
    fn program(&self) -> &str;

    /// Check if the tool is available on the system
    fn is_available(&self) -> bool {
        which::which(self.program()).is_ok()
    }

    /// Lint `scan_path`, a copy of the document at `real_path`
    ///
    /// `real_path` decides whether the document is PHP at all and which
    /// rulesets apply to it.
    fn hints(&self, scan_path: &Path, real_path: &Path) -> Result<Vec<Hint>, AdapterError>;
}

/// Only `.php` documents are linted
pub fn is_php(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".php")
}

/// Run a program to completion and return its stdout
///
/// The exit status is only logged: PHPMD and PHPCS exit non-zero whenever
/// they report a violation.
pub(crate) fn run_tool(adapter: &'static str, program: &str, args: &[String]) -> Result<String, AdapterError> {
    logging::log_command(adapter, program, args);

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| AdapterError::Launch {
            program: program.to_string(),
            source,
        })?;

    logging::log_tool_exit(adapter, output.status, &output.stderr);

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Hints from one run per ruleset
///
/// A failing run is logged and the remaining rulesets still run. The first
/// error is returned only when every run failed.
pub(crate) fn per_ruleset<F>(
    adapter: &'static str,
    rulesets: &[String],
    mut run: F,
) -> Result<Vec<Hint>, AdapterError>
where
    F: FnMut(&str) -> Result<Vec<Hint>, AdapterError>,
{
    let mut hints = Vec::new();
    let mut first_error = None;
    let mut succeeded = false;

    for ruleset in rulesets {
        match run(ruleset) {
            Ok(found) => {
                succeeded = true;
                hints.extend(found);
            }
            Err(error) => {
                logging::entry(adapter, &format!("ruleset {} failed: {}", ruleset, error));
                first_error.get_or_insert(error);
            }
        }
    }

    match first_error {
        Some(error) if !succeeded => Err(error),
        _ => Ok(hints),
    }
}

/// Convert a one-based position reported by a tool to zero-based
pub(crate) fn zero_based(value: usize) -> usize {
    value.saturating_sub(1)
}
