//! Output formatting for phphints
//!
//! Supports text (colored terminal), JSON and unified diff output.

use anyhow::Result;
use colored::*;
use phphints_core::Hint;
use phphints_linters::AdapterFailure;
use phphints_repair::{AppliedRepair, SkipReason, SkippedHint};
use serde::Serialize;
use std::path::Path;

use crate::process::RepairResult;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Diff,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "diff" => Some(OutputFormat::Diff),
            _ => None,
        }
    }
}

/// What the run was doing, for the closing summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Lint,
    RepairCheck,
    RepairFix,
}

/// A hint with one-based positions
#[derive(Debug, Clone, Serialize)]
pub struct HintInfo {
    pub source: String,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub message: String,
    pub priority: i32,
    pub color: String,
}

impl HintInfo {
    pub fn from_hint(hint: &Hint) -> Self {
        Self {
            source: hint.source.clone(),
            line: hint.line_begin + 1,
            column: hint.column_begin + 1,
            end_line: hint.line_end + 1,
            end_column: hint.column_end + 1,
            message: hint.message.clone(),
            priority: hint.priority,
            color: hint.color.to_string(),
        }
    }
}

/// An adapter that could not run on a file
#[derive(Debug, Clone, Serialize)]
pub struct FailureInfo {
    pub adapter: String,
    pub error: String,
}

impl From<&AdapterFailure> for FailureInfo {
    fn from(failure: &AdapterFailure) -> Self {
        Self {
            adapter: failure.adapter.to_string(),
            error: failure.error.to_string(),
        }
    }
}

/// Result of processing a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<HintInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub applied: Vec<AppliedRepair>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedHint>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    fn new(path: &Path) -> Self {
        Self {
            path: path.display().to_string(),
            hints: Vec::new(),
            applied: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
            error: None,
        }
    }

    fn repaired(path: &Path, result: &RepairResult) -> Self {
        Self {
            applied: result.applied.clone(),
            skipped: result.skipped.clone(),
            failures: result.failures.iter().map(FailureInfo::from).collect(),
            ..Self::new(path)
        }
    }
}

/// Summary statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub files_processed: usize,
    pub files_with_hints: usize,
    pub total_hints: usize,
    pub files_with_changes: usize,
    pub total_repairs: usize,
    pub adapter_failures: usize,
    pub errors: usize,
}

/// Full JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    pub version: String,
    pub summary: Summary,
    pub files: Vec<FileResult>,
}

/// Reporter for accumulating and outputting results
pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
    results: Vec<FileResult>,
    summary: Summary,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            verbose,
            results: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Report the hints found in a file
    pub fn report_hints(&mut self, path: &Path, hints: &[Hint], failures: &[AdapterFailure]) {
        self.summary.files_processed += 1;
        self.report_failures(path, failures);

        let mut result = FileResult::new(path);
        result.failures = failures.iter().map(FailureInfo::from).collect();

        if hints.is_empty() {
            if self.verbose && self.format != OutputFormat::Json {
                println!("{}: No hints", path.display());
            }
            self.results.push(result);
            return;
        }

        self.summary.files_with_hints += 1;
        self.summary.total_hints += hints.len();

        if self.format != OutputFormat::Json {
            println!("{}", path.display().to_string().bold());
            for hint in hints {
                let (red, green, blue) = hint.color.rgb();
                println!(
                    "  {:>4}:{:<3} {} {}",
                    hint.line_begin + 1,
                    hint.column_begin + 1,
                    format!("[{}]", hint.source).truecolor(red, green, blue),
                    hint.message
                );
            }
            println!();
        }

        result.hints = hints.iter().map(HintInfo::from_hint).collect();
        self.results.push(result);
    }

    /// Report what a repair would change without writing it
    pub fn report_repair_check(&mut self, path: &Path, result: &RepairResult) {
        self.summary.files_processed += 1;
        self.report_failures(path, &result.failures);

        if !result.changed() {
            if self.format == OutputFormat::Text {
                self.report_unchanged(path, &result.skipped);
            }
            self.results.push(FileResult::repaired(path, result));
            return;
        }

        self.summary.files_with_changes += 1;
        self.summary.total_repairs += result.applied.len();

        match self.format {
            OutputFormat::Text => {
                println!("{}", path.display().to_string().bold());
                print_diff(&result.old_source, &result.new_source);
                println!();
                for repair in &result.applied {
                    println!("  {} line {}: {}", "->".green(), repair.line + 1, repair.message);
                }
                print_skipped(&result.skipped);
                println!();
            }
            OutputFormat::Diff => {
                print_unified_diff(path, &result.old_source, &result.new_source);
            }
            OutputFormat::Json => {}
        }

        self.results.push(FileResult::repaired(path, result));
    }

    /// Report a file after its repairs were written
    pub fn report_repair_fix(&mut self, path: &Path, result: &RepairResult) {
        self.summary.files_processed += 1;
        self.report_failures(path, &result.failures);

        if !result.changed() {
            if self.format == OutputFormat::Text {
                self.report_unchanged(path, &result.skipped);
            }
            self.results.push(FileResult::repaired(path, result));
            return;
        }

        self.summary.files_with_changes += 1;
        self.summary.total_repairs += result.applied.len();

        if self.format == OutputFormat::Text {
            println!("{}", path.display().to_string().bold());
            println!("  {} Applied {} repair(s)", "OK".green(), result.applied.len());
            print_skipped(&result.skipped);
            println!();
        }

        self.results.push(FileResult::repaired(path, result));
    }

    /// Report an error processing a file
    pub fn report_error(&mut self, path: &Path, error: &str) {
        self.summary.files_processed += 1;
        self.summary.errors += 1;

        if self.format == OutputFormat::Text {
            eprintln!("{}: {} - {}", "Warning".yellow(), path.display(), error);
        }

        let mut result = FileResult::new(path);
        result.error = Some(error.to_string());
        self.results.push(result);
    }

    fn report_unchanged(&self, path: &Path, skipped: &[SkippedHint]) {
        if !skipped.is_empty() {
            println!("{}", path.display().to_string().bold());
            print_skipped(skipped);
            println!();
        } else if self.verbose {
            println!("{}: No repairs", path.display());
        }
    }

    fn report_failures(&mut self, path: &Path, failures: &[AdapterFailure]) {
        self.summary.adapter_failures += failures.len();

        if self.format == OutputFormat::Json {
            return;
        }
        for failure in failures {
            eprintln!(
                "{}: {} - {} produced no hints: {}",
                "Warning".yellow(),
                path.display(),
                failure.adapter,
                failure.error
            );
        }
    }

    /// Print final summary/output
    pub fn finish(self, mode: RunMode) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                println!();
                println!("{}", "Summary".bold().underline());
                println!("  Files processed: {}", self.summary.files_processed);
                match mode {
                    RunMode::Lint => {
                        println!("  Files with hints: {}", self.summary.files_with_hints);
                        println!("  Total hints: {}", self.summary.total_hints);
                    }
                    RunMode::RepairCheck | RunMode::RepairFix => {
                        println!("  Files with changes: {}", self.summary.files_with_changes);
                        println!("  Total repairs: {}", self.summary.total_repairs);
                    }
                }
                if self.summary.adapter_failures > 0 {
                    println!("  Adapter failures: {}", self.summary.adapter_failures);
                }
                if self.summary.errors > 0 {
                    println!("  Errors: {}", self.summary.errors);
                }

                if mode == RunMode::RepairCheck && self.summary.total_repairs > 0 {
                    println!();
                    println!("{}", "Run with --fix to apply repairs".yellow());
                }
            }
            OutputFormat::Json => {
                let output = JsonOutput {
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    summary: self.summary,
                    files: self.results,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            // patch-compatible output carries no summary
            OutputFormat::Diff => {}
        }

        Ok(())
    }

    /// Get summary for exit code determination
    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

fn print_skipped(skipped: &[SkippedHint]) {
    for hint in skipped {
        println!("  {} {}", "!".yellow(), describe_skipped(hint));
    }
}

/// One line for a message the repair engine left alone
fn describe_skipped(hint: &SkippedHint) -> String {
    let reason = match &hint.reason {
        SkipReason::NoRule => "no repair rule".to_string(),
        SkipReason::NotApplied(rule) => format!("{} found nothing to change", rule),
        SkipReason::InvalidEdit(error) => format!("invalid edit: {}", error),
    };
    format!("line {}: {} ({})", hint.line + 1, hint.message, reason)
}

/// Print a colored diff between old and new content
fn print_diff(old: &str, new: &str) {
    for diff_result in diff::lines(old, new) {
        match diff_result {
            diff::Result::Left(l) => println!("  {}", format!("- {}", l).red()),
            diff::Result::Right(r) => println!("  {}", format!("+ {}", r).green()),
            diff::Result::Both(_, _) => {}
        }
    }
}

/// Unified diff text, `diff -u` compatible
pub fn unified_diff(path: &Path, old: &str, new: &str) -> String {
    let diff = similar::TextDiff::from_lines(old, new);
    let path_str = path.display().to_string();

    diff.unified_diff()
        .context_radius(3)
        .header(&format!("a/{}", path_str), &format!("b/{}", path_str))
        .to_string()
}

fn print_unified_diff(path: &Path, old: &str, new: &str) {
    print!("{}", unified_diff(path, old, new));
}
