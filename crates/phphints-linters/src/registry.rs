//! Ruleset registry
//!
//! Each tool keeps a CSV file of `(directory, ruleset)` rows. A row applies
//! to every file whose path starts with the directory, so one project can
//! use its own PHPMD ruleset or PHPCS standard while another uses a
//! different one.

use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::csv;

/// Errors that can occur while reading or changing a registry
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to access ruleset registry {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed row on line {line} of {path}: expected 2 fields, found {found}")]
    MalformedRow { path: PathBuf, line: usize, found: usize },

    #[error("Unterminated quoted field starting on line {line} of {path}")]
    UnterminatedQuote { path: PathBuf, line: usize },

    #[error("Directory and ruleset must both be non-empty")]
    EmptyField,
}

/// One registration: files below `directory` are checked against `ruleset`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ruleset {
    pub directory: String,
    pub ruleset: String,
}

impl Ruleset {
    pub fn new(directory: impl Into<String>, ruleset: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            ruleset: ruleset.into(),
        }
    }

    /// Whether this registration covers the given file path
    pub fn applies_to(&self, file_path: &str) -> bool {
        file_path.starts_with(&self.directory)
    }
}

/// A CSV-backed list of ruleset registrations for one tool
#[derive(Debug, Clone)]
pub struct RulesetRegistry {
    path: PathBuf,
}

impl RulesetRegistry {
    /// Open the registry at `path`, creating parent directories and an
    /// empty file when they are missing
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let registry = Self { path: path.into() };

        if let Some(parent) = registry.path.parent() {
            fs::create_dir_all(parent).map_err(|e| registry.io_error(e))?;
        }
        if !registry.path.exists() {
            fs::write(&registry.path, "").map_err(|e| registry.io_error(e))?;
        }

        Ok(registry)
    }

    /// Open `<data_dir>/<tool>/rulesets.csv`
    pub fn for_tool(data_dir: &Path, tool: &str) -> Result<Self, RegistryError> {
        Self::open(data_dir.join(tool).join("rulesets.csv"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All registrations in file order
    pub fn all(&self) -> Result<Vec<Ruleset>, RegistryError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let records = csv::parse(&content).map_err(|e| RegistryError::UnterminatedQuote {
            path: self.path.clone(),
            line: e.line,
        })?;

        records
            .into_iter()
            .map(|record| match <[String; 2]>::try_from(record.fields) {
                Ok([directory, ruleset]) => Ok(Ruleset { directory, ruleset }),
                Err(fields) => Err(RegistryError::MalformedRow {
                    path: self.path.clone(),
                    line: record.line,
                    found: fields.len(),
                }),
            })
            .collect()
    }

    /// Registrations covering `file_path`, in file order
    pub fn matching(&self, file_path: &str) -> Result<Vec<Ruleset>, RegistryError> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|entry| entry.applies_to(file_path))
            .collect())
    }

    /// Append a registration
    pub fn add(&self, directory: &str, ruleset: &str) -> Result<(), RegistryError> {
        if directory.is_empty() || ruleset.is_empty() {
            return Err(RegistryError::EmptyField);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        file.write_all(csv::write_record(&[directory, ruleset]).as_bytes())
            .map_err(|e| self.io_error(e))
    }

    /// Remove every registration equal to the pair; returns how many were removed
    pub fn remove(&self, directory: &str, ruleset: &str) -> Result<usize, RegistryError> {
        let entries = self.all()?;
        let before = entries.len();

        let kept: Vec<Ruleset> = entries
            .into_iter()
            .filter(|entry| entry.directory != directory || entry.ruleset != ruleset)
            .collect();
        let removed = before - kept.len();

        if removed > 0 {
            self.write_all(&kept)?;
        }

        Ok(removed)
    }

    /// Drop every registration
    pub fn reset(&self) -> Result<(), RegistryError> {
        self.write_all(&[])
    }

    fn write_all(&self, entries: &[Ruleset]) -> Result<(), RegistryError> {
        let content: String = entries
            .iter()
            .map(|entry| csv::write_record(&[&entry.directory, &entry.ruleset]))
            .collect();

        fs::write(&self.path, content).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> RegistryError {
        RegistryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn registry(temp: &TempDir) -> RulesetRegistry {
        RulesetRegistry::for_tool(temp.path(), "phpmd").unwrap()
    }

    #[test]
    fn test_open_creates_file() {
        let temp = TempDir::new().unwrap();
        let registry = registry(&temp);

        assert_eq!(registry.path(), temp.path().join("phpmd/rulesets.csv"));
        assert!(registry.path().exists());
        assert!(registry.all().unwrap().is_empty());
    }

    #[test]
    fn test_add_and_read_back_in_order() {
        let temp = TempDir::new().unwrap();
        let registry = registry(&temp);

        registry.add("/srv/app", "/srv/app/phpmd.xml").unwrap();
        registry.add("/srv/my, app", "rules \"strict\".xml").unwrap();

        assert_eq!(
            registry.all().unwrap(),
            vec![
                Ruleset::new("/srv/app", "/srv/app/phpmd.xml"),
                Ruleset::new("/srv/my, app", "rules \"strict\".xml"),
            ]
        );
    }

    #[test]
    fn test_reopen_keeps_rows() {
        let temp = TempDir::new().unwrap();
        registry(&temp).add("/srv/app", "PSR2").unwrap();

        let reopened = registry(&temp);
        assert_eq!(reopened.all().unwrap(), vec![Ruleset::new("/srv/app", "PSR2")]);
    }

    #[test]
    fn test_add_rejects_empty_fields() {
        let temp = TempDir::new().unwrap();
        let registry = registry(&temp);

        assert!(matches!(registry.add("", "PSR2"), Err(RegistryError::EmptyField)));
        assert!(matches!(registry.add("/srv", ""), Err(RegistryError::EmptyField)));
    }

    #[test]
    fn test_remove_only_exact_pairs() {
        let temp = TempDir::new().unwrap();
        let registry = registry(&temp);

        registry.add("/srv/app", "a.xml").unwrap();
        registry.add("/srv/app", "b.xml").unwrap();
        registry.add("/srv/lib", "a.xml").unwrap();
        registry.add("/srv/app", "a.xml").unwrap();

        assert_eq!(registry.remove("/srv/app", "a.xml").unwrap(), 2);
        assert_eq!(registry.remove("/srv/none", "a.xml").unwrap(), 0);
        assert_eq!(
            registry.all().unwrap(),
            vec![Ruleset::new("/srv/app", "b.xml"), Ruleset::new("/srv/lib", "a.xml")]
        );
    }

    #[test]
    fn test_reset() {
        let temp = TempDir::new().unwrap();
        let registry = registry(&temp);

        registry.add("/srv/app", "a.xml").unwrap();
        registry.reset().unwrap();

        assert!(registry.all().unwrap().is_empty());
    }

    #[test]
    fn test_matching_uses_prefix() {
        let temp = TempDir::new().unwrap();
        let registry = registry(&temp);

        registry.add("/srv/app", "app.xml").unwrap();
        registry.add("/srv/app/legacy", "legacy.xml").unwrap();
        registry.add("/srv/lib", "lib.xml").unwrap();

        let matched: Vec<String> = registry
            .matching("/srv/app/legacy/Foo.php")
            .unwrap()
            .into_iter()
            .map(|r| r.ruleset)
            .collect();
        assert_eq!(matched, vec!["app.xml", "legacy.xml"]);
    }

    #[test]
    fn test_reads_crlf_rows_written_by_other_tools() {
        let temp = TempDir::new().unwrap();
        let registry = registry(&temp);
        fs::write(registry.path(), "/srv/app,PSR2\r\n/srv/lib,PSR12\r\n").unwrap();

        assert_eq!(
            registry.all().unwrap(),
            vec![Ruleset::new("/srv/app", "PSR2"), Ruleset::new("/srv/lib", "PSR12")]
        );
    }

    #[test]
    fn test_malformed_row() {
        let temp = TempDir::new().unwrap();
        let registry = registry(&temp);
        fs::write(registry.path(), "/srv/app,PSR2\nonly-one-field\n").unwrap();

        match registry.all() {
            Err(RegistryError::MalformedRow { line, found, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(found, 1);
            }
            other => panic!("expected malformed row, got {:?}", other),
        }
    }
}
