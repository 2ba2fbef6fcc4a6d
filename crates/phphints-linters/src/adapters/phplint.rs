//! Syntax errors from nikic/PHP-Parser's `php-parse`
//!
//! With `-c` the parser reports errors with column info:
//!
//! ```text
//! ==> Syntax error, unexpected T_STRING from 3:7 to 3:9
//! ```

use phphints_core::{Color, Hint};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use super::{is_php, run_tool, zero_based, Adapter, AdapterError, ToolPaths};

const NAME: &str = "phplint";
const COLOR: Color = Color::new(0xFF, 0x00, 0x00);
const PRIORITY: i32 = 300;

/// PHP syntax check adapter
pub struct PhpLint {
    php: String,
    parser_script: Option<String>,
}

impl PhpLint {
    pub fn new(tools: &ToolPaths) -> Self {
        Self {
            php: tools.php.clone(),
            parser_script: tools
                .php_parser
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
        }
    }

    /// The program and its arguments for linting `path`
    fn command(&self, path: &Path) -> (String, Vec<String>) {
        let mut args = Vec::new();
        let program = match &self.parser_script {
            Some(script) => {
                args.push(script.clone());
                self.php.clone()
            }
            None => "php-parse".to_string(),
        };
        args.extend(["-c".to_string(), "--no-dump".to_string()]);
        args.push(path.to_string_lossy().into_owned());
        (program, args)
    }
}

impl Default for PhpLint {
    fn default() -> Self {
        Self::new(&ToolPaths::default())
    }
}

fn error_line_regex() -> &'static Regex {
    static ERROR_LINE: OnceLock<Regex> = OnceLock::new();
    ERROR_LINE.get_or_init(|| {
        Regex::new(r"^(=+> )?(.*) from (\d+):(\d+) to (\d+):(\d+)").expect("error line pattern is valid")
    })
}

/// Turn `php-parse` output into hints; lines that are not errors are skipped
pub fn parse_output(output: &str) -> Vec<Hint> {
    let re = error_line_regex();

    output
        .lines()
        .filter_map(|line| {
            let caps = re.captures(line)?;
            let number = |i: usize| caps[i].parse::<usize>().ok();

            Some(
                Hint::new(
                    (zero_based(number(3)?), zero_based(number(5)?)),
                    (zero_based(number(4)?), number(6)?),
                    &caps[2],
                    COLOR,
                    PRIORITY,
                )
                .with_source(NAME),
            )
        })
        .collect()
}

impl Adapter for PhpLint {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Syntax errors reported by PHP-Parser"
    }

    fn color(&self) -> Color {
        COLOR
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn program(&self) -> &str {
        match self.parser_script {
            Some(_) => self.php.as_str(),
            None => "php-parse",
        }
    }

    fn is_available(&self) -> bool {
        let script_present = self
            .parser_script
            .as_ref()
            .map_or(true, |script| Path::new(script).is_file());
        script_present && which::which(self.program()).is_ok()
    }

    fn hints(&self, scan_path: &Path, real_path: &Path) -> Result<Vec<Hint>, AdapterError> {
        if !is_php(real_path) {
            return Ok(Vec::new());
        }

        let (program, args) = self.command(scan_path);
        let output = run_tool(NAME, &program, &args)?;

        Ok(parse_output(&output))
    }
}
