//! Debug log for phphints
//!
//! A single process-wide log file, enabled on demand. Every lint gets a
//! section, every adapter run a subsection holding the commands it launched
//! and how they exited. The repair engine records which rule handled which
//! message. Nothing is written until `init_logger` has been called.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Mutex;

static LOGGER: Mutex<Option<DebugLogger>> = Mutex::new(None);

/// Timestamped, append-only log file
pub struct DebugLogger {
    file: File,
    path: PathBuf,
}

impl DebugLogger {
    /// Open `log_path` for appending, so runs of the LSP server and the CLI
    /// can share one file
    pub fn open(log_path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(log_path)?;

        Ok(Self {
            file,
            path: log_path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&mut self, line: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let _ = writeln!(self.file, "[{}] {}", timestamp, line);
        let _ = self.file.flush();
    }

    /// `[scope] message`, or the bare message without a scope
    pub fn entry(&mut self, scope: Option<&str>, message: &str) {
        match scope {
            Some(scope) => self.write_line(&format!("[{}] {}", scope, message)),
            None => self.write_line(message),
        }
    }

    /// Title framed by lines of `rule`
    pub fn heading(&mut self, title: &str, rule: char, width: usize) {
        let separator: String = std::iter::repeat(rule).take(width).collect();
        self.write_line(&separator);
        self.write_line(title);
        self.write_line(&separator);
    }
}

fn with_logger(f: impl FnOnce(&mut DebugLogger)) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_mut() {
            f(logger);
        }
    }
}

/// Start logging to `log_path`
///
/// Without a path, logs go to a timestamped file in the system temp dir.
pub fn init_logger(log_path: Option<&Path>) -> std::io::Result<PathBuf> {
    let path = log_path.map(Path::to_path_buf).unwrap_or_else(|| {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        std::env::temp_dir().join(format!("phphints-{}.log", timestamp))
    });

    let logger = DebugLogger::open(&path)?;
    if let Ok(mut guard) = LOGGER.lock() {
        *guard = Some(logger);
    }

    Ok(path)
}

pub fn is_enabled() -> bool {
    LOGGER.lock().map(|guard| guard.is_some()).unwrap_or(false)
}

/// Message attributed to an adapter or a subsystem such as `lsp`
pub fn entry(scope: &str, message: &str) {
    with_logger(|logger| logger.entry(Some(scope), message));
}

/// One file being linted or repaired
pub fn section(title: &str) {
    with_logger(|logger| logger.heading(title, '=', 60));
}

/// One adapter run inside a section
pub fn log_adapter_start(adapter: &str) {
    with_logger(|logger| logger.heading(&format!("Adapter {}", adapter), '-', 40));
}

pub fn log_command(adapter: &str, program: &str, args: &[String]) {
    entry(adapter, &format!("running: {} {}", program, args.join(" ")));
}

/// Exit status and stderr of a finished tool
pub fn log_tool_exit(adapter: &str, status: ExitStatus, stderr: &[u8]) {
    entry(adapter, &format!("exited with {}", status));
    if !stderr.is_empty() {
        entry(adapter, &format!("stderr: {}", String::from_utf8_lossy(stderr).trim()));
    }
}

/// Hint count of an adapter run, or why it produced none
pub fn log_adapter_result(adapter: &str, result: Result<usize, &str>) {
    match result {
        Ok(count) => entry(adapter, &format!("{} hint(s)", count)),
        Err(error) => entry(adapter, &format!("FAILED: {}", error)),
    }
}

/// What the repair engine did for the message on `line` (zero-based)
pub fn log_repair(line: usize, message: &str, outcome: &str) {
    entry("repair", &format!("line {}: {} -> {}", line + 1, message, outcome));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_logger_writes_timestamped_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("debug.log");

        let mut logger = DebugLogger::open(&path).unwrap();
        logger.heading("Adapter phpcs", '-', 40);
        logger.entry(Some("phpcs"), "2 hint(s)");
        logger.entry(None, "done");
        assert_eq!(logger.path(), path.as_path());

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].ends_with(&"-".repeat(40)));
        assert!(lines[1].ends_with("] Adapter phpcs"));
        assert!(lines[3].starts_with('['));
        assert!(lines[3].ends_with("] [phpcs] 2 hint(s)"));
        assert!(lines[4].ends_with("] done"));
    }

    #[test]
    fn test_logger_appends() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("debug.log");

        DebugLogger::open(&path).unwrap().entry(None, "first");
        DebugLogger::open(&path).unwrap().entry(None, "second");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
