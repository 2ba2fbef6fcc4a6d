//! PHP Mess Detector adapter
//!
//! Runs `phpmd <file> xml <ruleset>` once for every registered ruleset whose
//! directory covers the document, and reads the XML report:
//!
//! ```xml
//! <pmd version="2.15.0">
//!   <file name="/tmp/phphints-x.php">
//!     <violation beginline="5" endline="5" rule="ShortVariable">
//!       Avoid variables with short names like $a.
//!     </violation>
//!   </file>
//! </pmd>
//! ```

use phphints_core::{Color, Hint};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::path::Path;

use super::{is_php, per_ruleset, run_tool, zero_based, Adapter, AdapterError, ToolPaths};
use crate::RulesetRegistry;

const NAME: &str = "phpmd";
const COLOR: Color = Color::new(0x8F, 0x78, 0x11);
const PRIORITY: i32 = 200;

/// PHPMD reports whole lines
const COLUMN_END: usize = 999;

#[derive(Debug, Deserialize)]
struct PmdReport {
    #[serde(rename = "file", default)]
    files: Vec<PmdFile>,
}

#[derive(Debug, Deserialize)]
struct PmdFile {
    #[serde(rename = "violation", default)]
    violations: Vec<PmdViolation>,
}

#[derive(Debug, Deserialize)]
struct PmdViolation {
    #[serde(rename = "@beginline")]
    begin_line: usize,
    #[serde(rename = "$text", default)]
    text: String,
}

/// PHPMD adapter; rulesets come from the tool's registry
pub struct PhpMd {
    program: String,
    registry: RulesetRegistry,
}

impl PhpMd {
    pub fn new(tools: &ToolPaths, registry: RulesetRegistry) -> Self {
        Self {
            program: tools.phpmd.clone(),
            registry,
        }
    }

    pub fn registry(&self) -> &RulesetRegistry {
        &self.registry
    }
}

/// Turn a PHPMD XML report into hints
pub fn parse_output(output: &str) -> Result<Vec<Hint>, AdapterError> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }

    let report: PmdReport = from_str(output).map_err(|e| AdapterError::Parse {
        adapter: NAME,
        message: e.to_string(),
    })?;

    Ok(report
        .files
        .into_iter()
        .flat_map(|file| file.violations)
        .map(|violation| {
            // endline is ignored: the marker covers the first line only
            let line = zero_based(violation.begin_line);
            Hint::new((line, line), (0, COLUMN_END), violation.text.trim(), COLOR, PRIORITY)
                .with_source(NAME)
        })
        .collect())
}

impl Adapter for PhpMd {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Mess detection by PHPMD, per registered ruleset"
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
            .filter(|ruleset| Path::new(ruleset).exists())
            .collect();

        per_ruleset(NAME, &rulesets, |ruleset| {
            let args = vec![
                scan_path.to_string_lossy().into_owned(),
                "xml".to_string(),
                ruleset.to_string(),
            ];
            parse_output(&run_tool(NAME, &self.program, &args)?)
        })
    }
}
