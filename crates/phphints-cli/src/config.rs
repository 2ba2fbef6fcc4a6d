//! Configuration file support for phphints
//!
//! Loads `.phphints.toml` from the current directory or its parents, and the
//! per-user adapter settings from `<config_dir>/phphints/settings.toml`.

use anyhow::{Context, Result};
use phphints_linters::ToolPaths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = ".phphints.toml";

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub adapters: AdapterStates,
    pub tools: ToolPaths,
    pub paths: PathsConfig,
    pub repair: RepairConfig,
    pub output: OutputConfig,
    pub log: LogConfig,
}

/// Which adapters run; unset entries fall back to the next layer
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AdapterStates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phplint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phpmd: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phpcs: Option<bool>,
}

impl AdapterStates {
    pub fn get(&self, name: &str) -> Option<bool> {
        match name {
            "phplint" => self.phplint,
            "phpmd" => self.phpmd,
            "phpcs" => self.phpcs,
            _ => None,
        }
    }

    /// Set a known adapter's state; returns false for unknown names
    pub fn set(&mut self, name: &str, active: bool) -> bool {
        let slot = match name {
            "phplint" => &mut self.phplint,
            "phpmd" => &mut self.phpmd,
            "phpcs" => &mut self.phpcs,
            _ => return false,
        };
        *slot = Some(active);
        true
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Glob patterns to exclude from processing
    pub exclude: Vec<String>,
    /// Where the ruleset registries live
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Lint-and-repair passes per file
    pub cycles: usize,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self { cycles: 1 }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text", "json" or "diff"
    pub format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Debug log file
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load config from `.phphints.toml` searching from current directory upward
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        Self::load_from(std::env::current_dir()?)
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return Ok(Some((Self::load_path(&config_path)?, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Directory holding the per-tool ruleset registries
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.paths.data_dir {
            Some(dir) => Ok(expand_home(dir)),
            None => dirs::data_local_dir()
                .map(|dir| dir.join("phphints"))
                .context("Could not determine the local data directory; set paths.data_dir"),
        }
    }

    /// Effective state of an adapter
    ///
    /// Adapters named with `--adapter` win outright. Otherwise the project
    /// config overrides the user settings, and adapters default to active.
    pub fn adapter_active(&self, user: &UserSettings, cli_adapters: &[String], name: &str) -> bool {
        if !cli_adapters.is_empty() {
            return cli_adapters.iter().any(|a| a == name);
        }

        self.adapters
            .get(name)
            .or_else(|| user.adapters.get(name))
            .unwrap_or(true)
    }

    /// Check if a path should be excluded based on config patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.paths.exclude {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
                if let Some(file_name) = path.file_name() {
                    if glob_pattern.matches(&file_name.to_string_lossy()) {
                        return true;
                    }
                }
            }

            // Directory patterns match any path component
            if pattern.ends_with('/') {
                let dir_pattern = pattern.trim_end_matches('/');
                if path_str.contains(&format!("/{}/", dir_pattern))
                    || path_str.starts_with(&format!("{}/", dir_pattern))
                {
                    return true;
                }
            }
        }

        false
    }
}

/// Per-user settings written by `phphints adapters --enable/--disable`
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UserSettings {
    pub adapters: AdapterStates,
}

impl UserSettings {
    /// `<config_dir>/phphints/settings.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("phphints").join("settings.toml"))
    }

    /// Load settings; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = toml::to_string(self).context("Failed to serialize settings")?;
        std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Replace a leading `~/` with the home directory
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_config(dir: &Path, content: &str) {
        fs::write(dir.join(CONFIG_FILE), content).unwrap();
    }

    #[test]
    fn test_load_full_config() {
        let temp = TempDir::new().unwrap();
        create_config(
            temp.path(),
            r#"
[adapters]
phpmd = false

[tools]
php = "/usr/bin/php8.2"
php_parser = "/opt/PHP-Parser/bin/php-parse.php"

[paths]
exclude = ["vendor/", "*.tpl.php"]
data_dir = "/srv/phphints"

[repair]
cycles = 3

[output]
format = "json"

[log]
file = "/tmp/phphints.log"
"#,
        );

        let (config, path) = Config::load_from(temp.path().to_path_buf()).unwrap().unwrap();

        assert_eq!(path, temp.path().join(CONFIG_FILE));
        assert_eq!(config.adapters.phpmd, Some(false));
        assert_eq!(config.adapters.phplint, None);
        assert_eq!(config.tools.php, "/usr/bin/php8.2");
        assert_eq!(
            config.tools.php_parser,
            Some(PathBuf::from("/opt/PHP-Parser/bin/php-parse.php"))
        );
        assert_eq!(config.tools.phpcs, "phpcs");
        assert_eq!(config.paths.exclude, vec!["vendor/", "*.tpl.php"]);
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/srv/phphints"));
        assert_eq!(config.repair.cycles, 3);
        assert_eq!(config.output.format.as_deref(), Some("json"));
        assert_eq!(config.log.file, Some(PathBuf::from("/tmp/phphints.log")));
    }

    #[test]
    fn test_load_empty_config() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "");

        let (config, _) = Config::load_from(temp.path().to_path_buf()).unwrap().unwrap();

        assert_eq!(config.adapters, AdapterStates::default());
        assert_eq!(config.tools, ToolPaths::default());
        assert!(config.paths.exclude.is_empty());
        assert_eq!(config.repair.cycles, 1);
        assert!(config.output.format.is_none());
        assert!(config.log.file.is_none());
    }

    #[test]
    fn test_config_found_in_parent() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "[repair]\ncycles = 2\n");
        let nested = temp.path().join("src/Controller");
        fs::create_dir_all(&nested).unwrap();

        let (config, path) = Config::load_from(nested).unwrap().unwrap();
        assert_eq!(path, temp.path().join(CONFIG_FILE));
        assert_eq!(config.repair.cycles, 2);
    }

    #[test]
    fn test_invalid_config() {
        let temp = TempDir::new().unwrap();
        create_config(temp.path(), "[repair]\ncycles = \"many\"\n");

        assert!(Config::load_from(temp.path().to_path_buf()).is_err());
    }

    #[test]
    fn test_adapter_layers() {
        let mut config = Config::default();
        let mut user = UserSettings::default();

        assert!(config.adapter_active(&user, &[], "phpcs"));

        user.adapters.set("phpcs", false);
        assert!(!config.adapter_active(&user, &[], "phpcs"));

        config.adapters.phpcs = Some(true);
        assert!(config.adapter_active(&user, &[], "phpcs"));

        let only_lint = vec!["phplint".to_string()];
        assert!(config.adapter_active(&user, &only_lint, "phplint"));
        assert!(!config.adapter_active(&user, &only_lint, "phpcs"));
    }

    #[test]
    fn test_user_settings_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("phphints/settings.toml");

        assert_eq!(UserSettings::load(&path).unwrap(), UserSettings::default());

        let mut settings = UserSettings::default();
        assert!(settings.adapters.set("phpmd", false));
        assert!(!settings.adapters.set("psalm", true));
        settings.save(&path).unwrap();

        let loaded = UserSettings::load(&path).unwrap();
        assert_eq!(loaded.adapters.phpmd, Some(false));
        assert_eq!(loaded.adapters.phplint, None);
    }

    #[test]
    fn test_should_exclude_glob() {
        let config = Config {
            paths: PathsConfig {
                exclude: vec!["*.tpl.php".to_string()],
                data_dir: None,
            },
            ..Default::default()
        };

        assert!(config.should_exclude(Path::new("views/index.tpl.php")));
        assert!(!config.should_exclude(Path::new("src/Index.php")));
    }

    #[test]
    fn test_should_exclude_directory() {
        let config = Config {
            paths: PathsConfig {
                exclude: vec!["vendor/".to_string()],
                data_dir: None,
            },
            ..Default::default()
        };

        assert!(config.should_exclude(Path::new("project/vendor/autoload.php")));
        assert!(config.should_exclude(Path::new("vendor/package/file.php")));
        assert!(!config.should_exclude(Path::new("src/vendor.php")));
    }
}
