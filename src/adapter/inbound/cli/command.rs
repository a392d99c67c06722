//! Command-line interface definitions.
//!
//! Defines the CLI structure for the yieldkeeper binary using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Lending-strategy keeper
#[derive(Parser, Debug)]
#[command(name = "yieldkeeper")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the keeper against a simulated lending pool
    Run(RunArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Arguments for `yieldkeeper run`.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Override the number of simulated steps
    #[arg(long)]
    pub steps: Option<u32>,

    /// Migrate to a fresh strategy when the run ends
    #[arg(long)]
    pub migrate: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Subcommands for `yieldkeeper check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file without running anything
    Config,
}
