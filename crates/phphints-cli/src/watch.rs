//! Watch mode for phphints - re-lint files as they change
//!
//! Uses the `notify` crate for cross-platform file watching with debouncing.

use anyhow::Result;
use colored::*;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, DebouncedEventKind};
use phphints_linters::HintManager;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::config::Config;
use crate::output::{OutputFormat, Reporter, RunMode};
use crate::process::{collect_files, lint_file};

/// Configuration for watch mode
pub struct WatchConfig {
    /// Paths to watch
    pub paths: Vec<PathBuf>,
    pub format: OutputFormat,
    pub verbose: bool,
    /// Debounce duration (default 100ms)
    pub debounce: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            paths: vec![],
            format: OutputFormat::Text,
            verbose: false,
            debounce: Duration::from_millis(100),
        }
    }
}

/// Run watch mode: lint every file once, then each file that changes
pub fn run_watch(watch: WatchConfig, config: &Config, manager: &HintManager) -> Result<()> {
    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(watch.debounce, tx)?;

    for path in &watch.paths {
        if path.is_dir() {
            debouncer.watcher().watch(path, RecursiveMode::Recursive)?;
        } else if let Some(parent) = path.parent().filter(|_| path.is_file()) {
            let parent = if parent.as_os_str().is_empty() { Path::new(".") } else { parent };
            debouncer.watcher().watch(parent, RecursiveMode::NonRecursive)?;
        } else {
            continue;
        }
        if watch.format == OutputFormat::Text {
            println!("{} Watching: {}", "→".cyan(), path.display());
        }
    }

    let (files, _) = collect_files(&watch.paths, config);
    lint_batch(&watch, manager, &files)?;
    print_waiting(&watch);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed = changed_php_files(&events, config);
                if changed.is_empty() {
                    continue;
                }

                if watch.format == OutputFormat::Text {
                    // clear screen, cursor to top
                    print!("\x1B[2J\x1B[1;1H");
                    println!("{}", "File changes detected, re-linting...".cyan());
                    println!();
                }

                lint_batch(&watch, manager, &changed)?;
                print_waiting(&watch);
            }
            Ok(Err(error)) => {
                eprintln!("{}: Watch error: {:?}", "Error".red(), error);
            }
            // channel closed
            Err(_) => break,
        }
    }

    Ok(())
}

/// Existing, non-excluded `.php` files named by a batch of events
fn changed_php_files(events: &[DebouncedEvent], config: &Config) -> Vec<PathBuf> {
    let mut changed: Vec<PathBuf> = Vec::new();

    for event in events {
        if event.kind != DebouncedEventKind::Any {
            continue;
        }
        let path = &event.path;
        if path.extension().is_some_and(|ext| ext == "php")
            && path.is_file()
            && !config.should_exclude(path)
            && !changed.contains(path)
        {
            changed.push(path.clone());
        }
    }

    changed.sort();
    changed
}

fn lint_batch(watch: &WatchConfig, manager: &HintManager, files: &[PathBuf]) -> Result<()> {
    let mut reporter = Reporter::new(watch.format, watch.verbose);

    for path in files {
        match lint_file(manager, path, None) {
            Ok(report) => reporter.report_hints(path, &report.hints, &report.failures),
            Err(e) => reporter.report_error(path, &format!("{:#}", e)),
        }
    }

    reporter.finish(RunMode::Lint)
}

fn print_waiting(watch: &WatchConfig) {
    if watch.format == OutputFormat::Text {
        println!();
        println!("{}", "Watching for changes (Ctrl+C to stop)...".dimmed());
    }
}
