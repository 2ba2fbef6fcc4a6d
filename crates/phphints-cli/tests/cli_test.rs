//! End-to-end runs of the phphints binary against missing linters

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Config pointing every tool at a program that does not exist
fn write_config(dir: &Path) -> PathBuf {
    let config = dir.join(".phphints.toml");
    fs::write(
        &config,
        format!(
            r#"
[tools]
php = "phphints-test-missing-php"
php_parser = "/nonexistent/php-parse.php"
phpmd = "phphints-test-missing-phpmd"
phpcs = "phphints-test-missing-phpcs"

[paths]
data_dir = "{}"
exclude = ["vendor/"]
"#,
            dir.join("data").display()
        ),
    )
    .unwrap();
    config
}

fn phphints(home: &Path, config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_phphints"))
        .args(args)
        .arg("--config")
        .arg(config)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

#[test]
fn test_lint_with_missing_tools_reports_no_hints() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(temp.path().join("src/A.php"), "<?php\necho 1;\n").unwrap();

    let src = temp.path().join("src");
    let output = phphints(temp.path(), &config, &["lint", src.to_str().unwrap(), "--format", "json"]);

    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["summary"]["files_processed"], 1);
    assert_eq!(json["summary"]["total_hints"], 0);
    assert_eq!(json["files"][0]["failures"][0]["adapter"], "phplint");
}

#[test]
fn test_ruleset_add_and_list() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let output = phphints(
        temp.path(),
        &config,
        &["ruleset", "add", "--tool", "phpcs", "--directory", "/srv/app", "--ruleset", "PSR2"],
    );
    assert!(output.status.success());

    let output = phphints(
        temp.path(),
        &config,
        &["ruleset", "--format", "json", "list", "--tool", "phpcs"],
    );
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["tool"], "phpcs");
    assert_eq!(json["rulesets"][0]["directory"], "/srv/app");
    assert_eq!(json["rulesets"][0]["ruleset"], "PSR2");

    let csv = fs::read_to_string(temp.path().join("data/phpcs/rulesets.csv")).unwrap();
    assert_eq!(csv, "/srv/app,PSR2\n");
}

#[test]
fn test_adapters_disable_persists() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let output = phphints(temp.path(), &config, &["adapters", "--disable", "phpmd"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("phpmd"));
    assert!(stdout.contains("disabled"));

    let settings = fs::read_to_string(temp.path().join("config/phphints/settings.toml")).unwrap();
    assert!(settings.contains("phpmd = false"));
}

#[test]
fn test_unknown_adapter_is_an_error() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());
    let file = temp.path().join("A.php");
    fs::write(&file, "<?php\n").unwrap();

    let output = phphints(temp.path(), &config, &["lint", file.to_str().unwrap(), "--adapter", "psalm"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown adapter 'psalm'"));
}

#[test]
fn test_repair_without_hints_changes_nothing() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());
    let file = temp.path().join("A.php");
    fs::write(&file, "<?php  \n").unwrap();

    let output = phphints(temp.path(), &config, &["repair", file.to_str().unwrap(), "--fix"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(fs::read_to_string(&file).unwrap(), "<?php  \n");
}

#[test]
fn test_ruleset_remove_missing_warns_on_stderr() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    let output = phphints(
        temp.path(),
        &config,
        &["ruleset", "remove", "--tool", "phpmd", "--directory", "/srv/app", "--ruleset", "rules.xml"],
    );

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no registration /srv/app -> rules.xml"));
}
