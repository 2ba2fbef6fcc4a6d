//! phphints CLI - lint and repair PHP files with external linters
//!
//! Adapters:
//! - phplint: syntax errors from nikic/PHP-Parser
//! - phpmd: PHP Mess Detector, per registered ruleset
//! - phpcs: PHP_CodeSniffer, per registered standard
//!
//! Sixteen PHP_CodeSniffer messages can be repaired automatically.

mod config;
mod lsp;
mod output;
mod process;
mod ruleset;
mod watch;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use phphints_core::logging;
use phphints_linters::HintManager;
use phphints_repair::RepairEngine;
use rayon::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use config::{Config, UserSettings};
use output::{OutputFormat, Reporter, RunMode};
use process::{collect_files, lint_file, repair_file, write_file, RepairResult};
use ruleset::RulesetAction;
use watch::WatchConfig;

#[derive(Parser)]
#[command(name = "phphints")]
#[command(version)]
#[command(about = "Lint and repair PHP files with php-parse, phpmd and phpcs")]
#[command(author = "phphints contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: auto-detect .phphints.toml)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long, global = true)]
    no_config: bool,

    /// Show verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Write a debug log of tool runs and repairs to this file
    #[arg(long, value_name = "PATH", global = true)]
    debug_log: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint files and print their hints
    Lint {
        /// Files or directories to lint
        #[arg(required_unless_present = "stdin")]
        paths: Vec<PathBuf>,

        /// Output format: text, json
        #[arg(long, value_name = "FORMAT")]
        format: Option<String>,

        /// Read the document from stdin instead of disk
        #[arg(long, requires = "stdin_path")]
        stdin: bool,

        /// Path the stdin document is linted as
        #[arg(long, value_name = "PATH")]
        stdin_path: Option<PathBuf>,

        /// Adapters to run (can be specified multiple times). Overrides settings.
        #[arg(long, short = 'a', value_name = "ADAPTER")]
        adapter: Vec<String>,
    },

    /// Repair PHP_CodeSniffer hints
    Repair {
        /// Files or directories to repair
        #[arg(required_unless_present = "list_rules")]
        paths: Vec<PathBuf>,

        /// Write the repaired files instead of showing a diff
        #[arg(long)]
        fix: bool,

        /// Output format: text, json, diff
        #[arg(long, value_name = "FORMAT")]
        format: Option<String>,

        /// Lint-and-repair passes per file
        #[arg(long, value_name = "N")]
        cycles: Option<usize>,

        /// List the repair rules and exit
        #[arg(long)]
        list_rules: bool,
    },

    /// Manage phpmd and phpcs ruleset registrations
    Ruleset {
        #[command(subcommand)]
        action: RulesetAction,

        /// Output format for list: text, json
        #[arg(long, value_name = "FORMAT")]
        format: Option<String>,
    },

    /// Show adapter states, or enable and disable adapters
    Adapters {
        /// Enable an adapter in the user settings
        #[arg(long, value_name = "ADAPTER")]
        enable: Vec<String>,

        /// Disable an adapter in the user settings
        #[arg(long, value_name = "ADAPTER")]
        disable: Vec<String>,
    },

    /// Re-lint files whenever they change
    Watch {
        /// Files or directories to watch
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Run the LSP server on stdio
    Lsp,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if let Some(log_path) = cli.debug_log.as_ref().or(config.log.file.as_ref()) {
        let path = logging::init_logger(Some(log_path.as_path()))
            .with_context(|| format!("Failed to open debug log {}", log_path.display()))?;
        if cli.verbose && logging::is_enabled() {
            eprintln!("{}: {}", "Debug log".bold(), path.display());
        }
    }

    let user_settings_path = UserSettings::default_path();
    let user = match &user_settings_path {
        Some(path) => UserSettings::load(path)?,
        None => UserSettings::default(),
    };

    match cli.command {
        Commands::Lint {
            ref paths,
            ref format,
            stdin,
            ref stdin_path,
            ref adapter,
        } => {
            let format = output_format(format.as_deref(), &config, &["text", "json"])?;
            let manager = build_manager(&config, &user, adapter)?;
            let stdin_path = if stdin { stdin_path.as_deref() } else { None };
            run_lint(&cli, &config, &manager, paths, stdin_path, format)
        }
        Commands::Repair {
            ref paths,
            fix,
            ref format,
            cycles,
            list_rules,
        } => {
            if list_rules {
                print_repair_rules()?;
                return Ok(ExitCode::SUCCESS);
            }
            let format = output_format(format.as_deref(), &config, &["text", "json", "diff"])?;
            let manager = build_manager(&config, &user, &[])?;
            let cycles = cycles.unwrap_or(config.repair.cycles);
            run_repair(&cli, &config, &manager, paths, fix, format, cycles)
        }
        Commands::Ruleset { action, ref format } => {
            let format = output_format(format.as_deref(), &config, &["text", "json"])?;
            ruleset::run(action, &config.data_dir()?, format)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Adapters {
            ref enable,
            ref disable,
        } => {
            let user = update_user_settings(user, user_settings_path.as_deref(), enable, disable)?;
            let manager = build_manager(&config, &user, &[])?;
            print_adapters(&manager);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Watch { ref paths } => {
            let manager = build_manager(&config, &user, &[])?;
            let watch = WatchConfig {
                paths: paths.clone(),
                verbose: cli.verbose,
                ..Default::default()
            };
            watch::run_watch(watch, &config, &manager)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Lsp => {
            let manager = build_manager(&config, &user, &[])?;
            let engine = RepairEngine::new()?;
            let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
            runtime.block_on(lsp::run_lsp_server(manager, engine, config.repair.cycles));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    if cli.no_config {
        return Ok(Config::default());
    }

    if let Some(config_path) = &cli.config {
        let config = Config::load_path(config_path)?;
        if cli.verbose {
            eprintln!("{}: {}", "Using config".bold(), config_path.display());
        }
        return Ok(config);
    }

    match Config::load()? {
        Some((config, path)) => {
            if cli.verbose {
                eprintln!("{}: {}", "Using config".bold(), path.display());
            }
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

/// `--format`, then `output.format` from the config, then text
fn output_format(cli_format: Option<&str>, config: &Config, valid: &[&str]) -> Result<OutputFormat> {
    let name = cli_format.or(config.output.format.as_deref()).unwrap_or("text");

    match OutputFormat::from_str(name) {
        Some(format) if valid.contains(&name.to_lowercase().as_str()) => Ok(format),
        _ => bail!(
            "Invalid output format '{}'. Valid options: {}",
            name,
            valid.join(", ")
        ),
    }
}

/// The standard adapters with their effective states applied
fn build_manager(config: &Config, user: &UserSettings, cli_adapters: &[String]) -> Result<HintManager> {
    let data_dir = config.data_dir()?;
    let mut manager = HintManager::with_defaults(&config.tools, &data_dir)?;

    for name in cli_adapters {
        manager.set_adapter_state(name, true)?;
    }
    for name in manager.adapter_names() {
        manager.set_adapter_state(name, config.adapter_active(user, cli_adapters, name))?;
    }

    Ok(manager)
}

fn update_user_settings(
    mut user: UserSettings,
    path: Option<&Path>,
    enable: &[String],
    disable: &[String],
) -> Result<UserSettings> {
    if enable.is_empty() && disable.is_empty() {
        return Ok(user);
    }

    let changes = enable.iter().map(|n| (n, true)).chain(disable.iter().map(|n| (n, false)));
    for (name, active) in changes {
        if !user.adapters.set(name, active) {
            bail!("Unknown adapter '{}' (known: phplint, phpmd, phpcs)", name);
        }
    }

    let path = path.context("Could not determine the user config directory")?;
    user.save(path)?;
    Ok(user)
}

fn print_repair_rules() -> Result<()> {
    let engine = RepairEngine::new()?;
    println!("{}", "Repair rules:".bold());
    for (name, description) in engine.registry().list_rules() {
        println!("  {} - {}", name.green(), description);
    }
    Ok(())
}

fn print_adapters(manager: &HintManager) {
    println!("{}", "Adapters:".bold());
    for name in manager.adapter_names() {
        let Some(adapter) = manager.adapter(name) else {
            continue;
        };

        let state = if manager.is_active(name) {
            "enabled".green()
        } else {
            "disabled".dimmed()
        };
        let available = if adapter.is_available() {
            adapter.program().normal()
        } else {
            format!("{} (not found)", adapter.program()).red()
        };

        println!("  {:<8} {:<9} {} - {}", name.bold(), state, available, adapter.description());
    }
}

fn run_lint(
    cli: &Cli,
    config: &Config,
    manager: &HintManager,
    paths: &[PathBuf],
    stdin_path: Option<&Path>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let mut reporter = Reporter::new(format, cli.verbose);

    if let Some(path) = stdin_path {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;

        match lint_file(manager, path, Some(&content)) {
            Ok(report) => reporter.report_hints(path, &report.hints, &report.failures),
            Err(e) => reporter.report_error(path, &format!("{:#}", e)),
        }
    } else {
        let (file_paths, missing_paths) = collect_files(paths, config);
        report_missing(&missing_paths, format);

        // rayon keeps the input order, which is sorted
        let results: Vec<_> = file_paths
            .par_iter()
            .map(|path| lint_file(manager, path, None))
            .collect();

        for (path, result) in file_paths.iter().zip(results) {
            match result {
                Ok(report) => reporter.report_hints(path, &report.hints, &report.failures),
                Err(e) => reporter.report_error(path, &format!("{:#}", e)),
            }
        }
    }

    let summary = reporter.summary();
    let exit_code = if summary.errors > 0 {
        ExitCode::from(1)
    } else if summary.total_hints > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    };

    reporter.finish(RunMode::Lint)?;
    Ok(exit_code)
}

fn run_repair(
    cli: &Cli,
    config: &Config,
    manager: &HintManager,
    paths: &[PathBuf],
    fix: bool,
    format: OutputFormat,
    cycles: usize,
) -> Result<ExitCode> {
    let engine = RepairEngine::new()?;
    let (file_paths, missing_paths) = collect_files(paths, config);
    report_missing(&missing_paths, format);

    if cli.verbose && format == OutputFormat::Text {
        println!("{}: {}", "Mode".bold(), if fix { "fix" } else { "check" });
        println!("{}: {}", "Cycles".bold(), cycles);
        println!();
    }

    let results: Vec<Result<RepairResult>> = file_paths
        .par_iter()
        .map(|path| repair_file(manager, &engine, path, cycles))
        .collect();

    let mut reporter = Reporter::new(format, cli.verbose);
    for (path, result) in file_paths.iter().zip(results) {
        let result = match result {
            Ok(result) => result,
            Err(e) => {
                reporter.report_error(path, &format!("{:#}", e));
                continue;
            }
        };

        if fix {
            if result.changed() {
                if let Err(e) = write_file(path, &result.new_source) {
                    reporter.report_error(path, &format!("{:#}", e));
                    continue;
                }
            }
            reporter.report_repair_fix(path, &result);
        } else {
            reporter.report_repair_check(path, &result);
        }
    }

    let summary = reporter.summary();
    let exit_code = if summary.errors > 0 {
        ExitCode::from(1)
    } else if !fix && summary.files_with_changes > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    };

    reporter.finish(if fix { RunMode::RepairFix } else { RunMode::RepairCheck })?;
    Ok(exit_code)
}

fn report_missing(missing_paths: &[PathBuf], format: OutputFormat) {
    if format != OutputFormat::Text {
        return;
    }
    for path in missing_paths {
        eprintln!("{}: Path does not exist: {}", "Warning".yellow(), path.display());
    }
}
