//! PHP_CodeSniffer adapter
//!
//! Runs `phpcs --report=xml --standard=<ruleset> <file>` once for every
//! registered ruleset whose directory covers the document. The ruleset may
//! be a path to a ruleset XML or the name of a bundled standard (`PSR2`),
//! so it is passed through unchecked.
//!
//! ```xml
//! <phpcs version="3.7.2">
//! <file name="/tmp/phphints-x.php" errors="1" warnings="1" fixable="1">
//!  <error line="3" column="1" source="PSR2.ControlStructures..." severity="5">Expected 1 space after IF keyword; 0 found</error>
//!  <warning line="9" column="121" source="Generic.Files.LineLength.TooLong" severity="5">Line exceeds 120 characters</warning>
//! </file>
//! </phpcs>
//! ```

use phphints_core::{Color, Hint};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::path::Path;

use super::{is_php, per_ruleset, run_tool, zero_based, Adapter, AdapterError, ToolPaths};
use crate::RulesetRegistry;

const NAME: &str = "phpcs";
const COLOR: Color = Color::new(0xA5, 0xA5, 0xA5);
const PRIORITY: i32 = 100;

#[derive(Debug, Deserialize)]
struct CsReport {
    #[serde(rename = "file", default)]
    files: Vec<CsFile>,
}

#[derive(Debug, Deserialize)]
struct CsFile {
    #[serde(rename = "$value", default)]
    entries: Vec<CsEntry>,
}

/// `<error>` and `<warning>` interleave in line order
#[derive(Debug, Deserialize)]
enum CsEntry {
    #[serde(rename = "error")]
    Error(CsMessage),
    #[serde(rename = "warning")]
    Warning(CsMessage),
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct CsMessage {
    #[serde(rename = "@line")]
    line: usize,
    #[serde(rename = "@column")]
    column: usize,
    #[serde(rename = "$text", default)]
    text: String,
}

/// PHP_CodeSniffer adapter; standards come from the tool's registry
pub struct PhpCs {
    program: String,
    registry: RulesetRegistry,
}

impl PhpCs {
    pub fn new(tools: &ToolPaths, registry: RulesetRegistry) -> Self {
        Self {
            program: tools.phpcs.clone(),
            registry,
        }
    }

    pub fn registry(&self) -> &RulesetRegistry {
        &self.registry
    }
}

/// Turn a PHPCS XML report into hints
///
/// Errors and warnings are merged back into report order (line, then
/// column), which the repair engine relies on.
pub fn parse_output(output: &str) -> Result<Vec<Hint>, AdapterError> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }

    let report: CsReport = from_str(output).map_err(|e| AdapterError::Parse {
        adapter: NAME,
        message: e.to_string(),
    })?;

    let mut hints = Vec::new();
    for file in report.files {
        let mut messages: Vec<CsMessage> = file
            .entries
            .into_iter()
            .filter_map(|entry| match entry {
                CsEntry::Error(message) | CsEntry::Warning(message) => Some(message),
                CsEntry::Other => None,
            })
            .collect();
        messages.sort_by_key(|m| (m.line, m.column));

        hints.extend(messages.into_iter().map(|message| {
            let line = zero_based(message.line);
            let column_begin = zero_based(message.column).max(1);
            Hint::new(
                (line, line),
                (column_begin, message.column),
                message.text.trim(),
                COLOR,
                PRIORITY,
            )
            .with_source(NAME)
        }));
    }

    Ok(hints)
}

impl Adapter for PhpCs {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Coding standard violations by PHP_CodeSniffer, per registered standard"
    }

    fn color(&self) -> Color {
        COLOR
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn program(&self) -> &str {
        &self.program
    }

    fn hints(&self, scan_path: &Path, real_path: &Path) -> Result<Vec<Hint>, AdapterError> {
        if !is_php(real_path) {
            return Ok(Vec::new());
        }

        let rulesets: Vec<String> = self
            .registry
            .matching(&real_path.to_string_lossy())?
            .into_iter()
            .map(|entry| entry.ruleset)
            .collect();

        per_ruleset(NAME, &rulesets, |ruleset| {
            let args = vec![
                "--report=xml".to_string(),
                format!("--standard={}", ruleset),
                scan_path.to_string_lossy().into_owned(),
            ];
            parse_output(&run_tool(NAME, &self.program, &args)?)
        })
    }
}
