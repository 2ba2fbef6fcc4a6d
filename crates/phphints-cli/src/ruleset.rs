//! `phphints ruleset` - manage the per-tool ruleset registrations

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use colored::*;
use phphints_linters::{Ruleset, RulesetRegistry};
use serde::Serialize;
use std::path::Path;

use crate::output::OutputFormat;

/// Tools that take rulesets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Tool {
    Phpmd,
    Phpcs,
}

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::Phpmd => "phpmd",
            Tool::Phpcs => "phpcs",
        }
    }
}

#[derive(Subcommand)]
pub enum RulesetAction {
    /// List the registrations for a tool
    List {
        #[arg(long, value_enum)]
        tool: Tool,
    },
    /// Check files below a directory against a ruleset
    Add {
        #[arg(long, value_enum)]
        tool: Tool,
        /// Directory prefix the ruleset applies to
        #[arg(long)]
        directory: String,
        /// Ruleset file (phpmd) or standard name or file (phpcs)
        #[arg(long)]
        ruleset: String,
    },
    /// Remove every registration equal to the pair
    Remove {
        #[arg(long, value_enum)]
        tool: Tool,
        #[arg(long)]
        directory: String,
        #[arg(long)]
        ruleset: String,
    },
    /// Drop every registration for a tool
    Reset {
        #[arg(long, value_enum)]
        tool: Tool,
    },
}

#[derive(Serialize)]
struct RulesetList<'a> {
    tool: &'static str,
    registry: String,
    rulesets: &'a [Ruleset],
}

/// Run a ruleset subcommand against the registries under `data_dir`
pub fn run(action: RulesetAction, data_dir: &Path, format: OutputFormat) -> Result<()> {
    let open = |tool: Tool| {
        RulesetRegistry::for_tool(data_dir, tool.name())
            .with_context(|| format!("Failed to open the {} ruleset registry", tool.name()))
    };

    match action {
        RulesetAction::List { tool } => {
            let registry = open(tool)?;
            let rulesets = registry.all()?;
            print_list(tool, &registry, &rulesets, format)?;
        }
        RulesetAction::Add {
            tool,
            directory,
            ruleset,
        } => {
            open(tool)?.add(&directory, &ruleset)?;
            println!("{} {} -> {}", "Added".green(), directory, ruleset);
        }
        RulesetAction::Remove {
            tool,
            directory,
            ruleset,
        } => {
            let removed = open(tool)?.remove(&directory, &ruleset)?;
            if removed == 0 {
                eprintln!("{}: no registration {} -> {}", "Warning".yellow(), directory, ruleset);
            } else {
                println!("{} {} registration(s)", "Removed".green(), removed);
            }
        }
        RulesetAction::Reset { tool } => {
            open(tool)?.reset()?;
            println!("{} all {} registrations", "Removed".green(), tool.name());
        }
    }

    Ok(())
}

fn print_list(tool: Tool, registry: &RulesetRegistry, rulesets: &[Ruleset], format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        let list = RulesetList {
            tool: tool.name(),
            registry: registry.path().display().to_string(),
            rulesets,
        };
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    println!("{} ({})", format!("{} rulesets", tool.name()).bold(), registry.path().display());
    if rulesets.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for entry in rulesets {
        println!("  {} -> {}", entry.directory.green(), entry.ruleset);
    }

    Ok(())
}
