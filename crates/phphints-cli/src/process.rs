//! File processing logic for phphints

use anyhow::{Context, Result};
use phphints_core::{logging, Hint};
use phphints_linters::{AdapterFailure, HintManager, LintReport};
use phphints_repair::{AppliedRepair, RepairEngine, SkippedHint};
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Split the command line paths into PHP files to process and paths that do
/// not exist
///
/// Directories are walked for `.php` files; explicitly named files are
/// always kept. Excluded paths are dropped in both cases.
pub fn collect_files(paths: &[PathBuf], config: &Config) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut file_paths = Vec::new();
    let mut missing_paths = Vec::new();

    for path in paths {
        if path.is_file() {
            if !config.should_exclude(path) {
                file_paths.push(path.clone());
            }
        } else if path.is_dir() {
            for entry in walkdir::WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "php"))
            {
                let file_path = entry.path();
                if !config.should_exclude(file_path) {
                    file_paths.push(file_path.to_path_buf());
                }
            }
        } else {
            missing_paths.push(path.clone());
        }
    }

    file_paths.sort();
    file_paths.dedup();
    (file_paths, missing_paths)
}

/// Lint one file, optionally from unsaved content
pub fn lint_file(manager: &HintManager, path: &Path, content: Option<&str>) -> Result<LintReport> {
    manager
        .hints_for_file(path, content)
        .with_context(|| format!("Failed to lint {}", path.display()))
}

/// Result of repairing a single file
#[derive(Debug)]
pub struct RepairResult {
    pub old_source: String,
    pub new_source: String,
    /// Repairs from every cycle, in the order they were made
    pub applied: Vec<AppliedRepair>,
    /// Hints left over by the last cycle
    pub skipped: Vec<SkippedHint>,
    /// Adapter failures from every lint pass
    pub failures: Vec<AdapterFailure>,
}

impl RepairResult {
    pub fn changed(&self) -> bool {
        self.old_source != self.new_source
    }
}

/// Lint `path` and repair it, up to `cycles` times
pub fn repair_file(manager: &HintManager, engine: &RepairEngine, path: &Path, cycles: usize) -> Result<RepairResult> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let report = lint_file(manager, path, None)?;
    repair_with_cycles(manager, engine, path, &source, report, cycles)
}

/// Repair `source` starting from an existing lint report
///
/// Each cycle applies the repairs for the current hints, then lints the
/// repaired text again so the next cycle works from fresh positions. The
/// loop stops early once a cycle changes nothing. At least one cycle runs.
pub fn repair_with_cycles(
    manager: &HintManager,
    engine: &RepairEngine,
    path: &Path,
    source: &str,
    report: LintReport,
    cycles: usize,
) -> Result<RepairResult> {
    let mut current = source.to_string();
    let mut hints: Vec<Hint> = report.hints;
    let mut failures = report.failures;
    let mut applied = Vec::new();
    let mut skipped = Vec::new();

    for cycle in 1..=cycles.max(1) {
        logging::section(&format!("Repair cycle {} for {}", cycle, path.display()));

        let outcome = engine.repair(&current, &hints);
        let changed = outcome.changed();
        skipped = outcome.skipped;
        if !changed {
            break;
        }

        applied.extend(outcome.applied);
        current = outcome.source;

        if cycle < cycles {
            let report = lint_file(manager, path, Some(&current))?;
            hints = report.hints;
            failures.extend(report.failures);
        }
    }

    Ok(RepairResult {
        old_source: source.to_string(),
        new_source: current,
        applied,
        skipped,
        failures,
    })
}

/// Write the processed result to the file
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}
