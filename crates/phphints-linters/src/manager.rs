//! Hint manager: runs the active adapters over one document

use phphints_core::{logging, sort_by_priority, Hint};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::adapters::{Adapter, AdapterError, PhpCs, PhpLint, PhpMd, ToolPaths};
use crate::{RegistryError, RulesetRegistry};

/// Errors that can occur while setting up or running a lint pass
#[derive(Error, Debug)]
pub enum ManagerError {
    #[error("Unknown adapter '{0}' (known: phplint, phpmd, phpcs)")]
    UnknownAdapter(String),

    #[error("Failed to prepare {path} for linting: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// An adapter that produced no hints because its run failed
#[derive(Debug)]
pub struct AdapterFailure {
    pub adapter: &'static str,
    pub error: AdapterError,
}

/// Result of linting one document
#[derive(Debug, Default)]
pub struct LintReport {
    /// Hints from every active adapter, stably sorted by priority
    pub hints: Vec<Hint>,
    pub failures: Vec<AdapterFailure>,
}

/// Owns the adapters and the set of active ones
pub struct HintManager {
    adapters: Vec<Box<dyn Adapter>>,
    active: Vec<&'static str>,
}

impl HintManager {
    /// Create a manager over the given adapters, all of them active
    ///
    /// Adapters run in the order given here.
    pub fn new(adapters: Vec<Box<dyn Adapter>>) -> Self {
        let active = adapters.iter().map(|a| a.name()).collect();
        Self { adapters, active }
    }

    /// The three standard adapters, with their registries under `data_dir`
    pub fn with_defaults(tools: &ToolPaths, data_dir: &Path) -> Result<Self, ManagerError> {
        let phpmd = RulesetRegistry::for_tool(data_dir, "phpmd")?;
        let phpcs = RulesetRegistry::for_tool(data_dir, "phpcs")?;

        Ok(Self::new(vec![
            Box::new(PhpLint::new(tools)),
            Box::new(PhpMd::new(tools, phpmd)),
            Box::new(PhpCs::new(tools, phpcs)),
        ]))
    }

    /// Activate or deactivate an adapter; repeating a state is a no-op
    pub fn set_adapter_state(&mut self, name: &str, active: bool) -> Result<(), ManagerError> {
        let name = self
            .adapter(name)
            .map(|a| a.name())
            .ok_or_else(|| ManagerError::UnknownAdapter(name.to_string()))?;

        let present = self.active.contains(&name);
        if active && !present {
            self.active.push(name);
        } else if !active && present {
            self.active.retain(|n| *n != name);
        }

        Ok(())
    }

    pub fn adapter_names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.iter().any(|n| *n == name)
    }

    pub fn adapter(&self, name: &str) -> Option<&dyn Adapter> {
        self.adapters.iter().find(|a| a.name() == name).map(|a| a.as_ref())
    }

    /// Lint the document at `path`
    ///
    /// `content` replaces the file's bytes on disk, for buffers that have not
    /// been saved. Either way the adapters see a temporary copy carrying the
    /// same extension, which is removed when the pass ends.
    pub fn hints_for_file(&self, path: &Path, content: Option<&str>) -> Result<LintReport, ManagerError> {
        let io_error = |source| ManagerError::Io {
            path: path.to_path_buf(),
            source,
        };

        let bytes = match content {
            Some(text) => text.as_bytes().to_vec(),
            None => fs::read(path).map_err(io_error)?,
        };

        let suffix = match path.extension() {
            Some(ext) => format!(".{}", ext.to_string_lossy()),
            None => ".tmp".to_string(),
        };

        let mut scan_file = tempfile::Builder::new()
            .prefix("phphints-")
            .suffix(&suffix)
            .tempfile()
            .map_err(io_error)?;
        scan_file.write_all(&bytes).map_err(io_error)?;
        scan_file.flush().map_err(io_error)?;

        logging::section(&format!("Linting {}", path.display()));

        let mut report = LintReport::default();
        for adapter in self.adapters.iter().filter(|a| self.is_active(a.name())) {
            logging::log_adapter_start(adapter.name());
            match adapter.hints(scan_file.path(), path) {
                Ok(hints) => {
                    logging::log_adapter_result(adapter.name(), Ok(hints.len()));
                    report.hints.extend(hints);
                }
                Err(error) => {
                    logging::log_adapter_result(adapter.name(), Err(&error.to_string()));
                    report.failures.push(AdapterFailure {
                        adapter: adapter.name(),
                        error,
                    });
                }
            }
        }

        sort_by_priority(&mut report.hints);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phphints_core::Color;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Records what it was asked to scan and returns canned hints
    struct FakeAdapter {
        name: &'static str,
        priority: i32,
        fail: bool,
        seen: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl FakeAdapter {
        fn boxed(name: &'static str, priority: i32, seen: &Arc<Mutex<Vec<(String, String)>>>) -> Box<dyn Adapter> {
            Box::new(Self {
                name,
                priority,
                fail: false,
                seen: Arc::clone(seen),
            })
        }
    }

    impl Adapter for FakeAdapter {
        fn name(&self) -> &'static str {
            self.name
        }

        fn description(&self) -> &'static str {
            "fake"
        }

        fn color(&self) -> Color {
            Color::new(0, 0, 0)
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn program(&self) -> &str {
            "true"
        }

        fn hints(&self, scan_path: &Path, real_path: &Path) -> Result<Vec<Hint>, AdapterError> {
            let content = fs::read_to_string(scan_path).unwrap();
            self.seen
                .lock()
                .unwrap()
                .push((scan_path.to_string_lossy().into_owned(), content));

            if self.fail {
                return Err(AdapterError::Parse {
                    adapter: self.name,
                    message: "garbage".to_string(),
                });
            }

            Ok(vec![Hint::new(
                (0, 0),
                (0, 1),
                format!("{} on {}", self.name, real_path.display()),
                self.color(),
                self.priority,
            )
            .with_source(self.name)])
        }
    }

    fn fake_manager(seen: &Arc<Mutex<Vec<(String, String)>>>) -> HintManager {
        HintManager::new(vec![
            FakeAdapter::boxed("phplint", 300, seen),
            FakeAdapter::boxed("phpmd", 200, seen),
            FakeAdapter::boxed("phpcs", 100, seen),
        ])
    }

    #[test]
    fn test_set_adapter_state() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut manager = fake_manager(&seen);

        assert_eq!(manager.adapter_names(), vec!["phplint", "phpmd", "phpcs"]);
        assert!(manager.is_active("phpmd"));

        manager.set_adapter_state("phpmd", false).unwrap();
        manager.set_adapter_state("phpmd", false).unwrap();
        assert!(!manager.is_active("phpmd"));

        manager.set_adapter_state("phpmd", true).unwrap();
        manager.set_adapter_state("phpmd", true).unwrap();
        assert!(manager.is_active("phpmd"));

        assert!(matches!(
            manager.set_adapter_state("psalm", true),
            Err(ManagerError::UnknownAdapter(name)) if name == "psalm"
        ));
    }

    #[test]
    fn test_hints_sorted_by_priority_and_order_fixed() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("Foo.php");
        fs::write(&file, "<?php\necho 1;\n").unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let manager = fake_manager(&seen);
        let report = manager.hints_for_file(&file, None).unwrap();

        let sources: Vec<&str> = report.hints.iter().map(|h| h.source.as_str()).collect();
        assert_eq!(sources, vec!["phpcs", "phpmd", "phplint"]);
        assert!(report.failures.is_empty());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        for (scan_path, content) in seen.iter() {
            assert!(scan_path.ends_with(".php"));
            assert_ne!(Path::new(scan_path), file);
            assert_eq!(content, "<?php\necho 1;\n");
        }
    }

    #[test]
    fn test_content_override_and_temp_file_removed() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("Foo.php");
        fs::write(&file, "on disk").unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut manager = fake_manager(&seen);
        manager.set_adapter_state("phpmd", false).unwrap();
        manager.set_adapter_state("phpcs", false).unwrap();

        let report = manager.hints_for_file(&file, Some("in the editor")).unwrap();
        assert_eq!(report.hints.len(), 1);

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].1, "in the editor");
        assert!(!Path::new(&seen[0].0).exists());
    }

    #[test]
    fn test_suffix_without_extension() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("Makefile");
        fs::write(&file, "all:\n").unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let manager = fake_manager(&seen);
        manager.hints_for_file(&file, None).unwrap();

        assert!(seen.lock().unwrap()[0].0.ends_with(".tmp"));
    }

    #[test]
    fn test_failed_adapter_yields_no_hints() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("Foo.php");
        fs::write(&file, "<?php\n").unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let manager = HintManager::new(vec![
            Box::new(FakeAdapter {
                name: "phplint",
                priority: 300,
                fail: true,
                seen: Arc::clone(&seen),
            }),
            FakeAdapter::boxed("phpcs", 100, &seen),
        ]);

        let report = manager.hints_for_file(&file, None).unwrap();
        assert_eq!(report.hints.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].adapter, "phplint");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let manager = fake_manager(&seen);

        let result = manager.hints_for_file(Path::new("/nonexistent/Foo.php"), None);
        assert!(matches!(result, Err(ManagerError::Io { .. })));
    }

    #[test]
    fn test_with_defaults_missing_tools_yield_no_hints() {
        let temp = TempDir::new().unwrap();
        let tools = ToolPaths {
            php: "phphints-no-such-php".to_string(),
            php_parser: Some(temp.path().join("php-parse.php")),
            phpmd: "phphints-no-such-phpmd".to_string(),
            phpcs: "phphints-no-such-phpcs".to_string(),
        };
        let manager = HintManager::with_defaults(&tools, temp.path()).unwrap();
        assert_eq!(manager.adapter_names(), vec!["phplint", "phpmd", "phpcs"]);

        let file = temp.path().join("Foo.php");
        fs::write(&file, "<?php\n").unwrap();

        let report = manager.hints_for_file(&file, None).unwrap();
        assert!(report.hints.is_empty());
        // phplint fails to launch; the empty registries run nothing
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].adapter, "phplint");
    }
}
