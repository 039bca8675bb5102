//! CLI command definitions and dispatch.

pub mod compare;
pub mod evaluate;
pub mod list;
pub mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use twinbuild_common::config::HarnessConfig;

/// twinbuild — compare images built by two different builders.
#[derive(Parser, Debug)]
#[command(name = "twinbuild", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// JSON configuration file; unset fields keep their defaults.
    #[arg(long, global = true, env = "TWINBUILD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build, compare and run every test case.
    Run(run::RunArgs),
    /// List discovered test cases.
    List(list::ListArgs),
    /// Diff two existing images and evaluate their equivalence.
    Compare(compare::CompareArgs),
    /// Evaluate a saved diff report without invoking any tool.
    Evaluate(evaluate::EvaluateArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Run(args) => run::execute(args, load_config(cli.config)?),
        Command::List(args) => list::execute(args, load_config(cli.config)?),
        Command::Compare(args) => compare::execute(args, load_config(cli.config)?),
        Command::Evaluate(args) => evaluate::execute(args),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<HarnessConfig> {
    match path {
        Some(path) => Ok(HarnessConfig::load(&path)?),
        None => Ok(HarnessConfig::default()),
    }
}
