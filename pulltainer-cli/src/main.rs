//! Pulltainer: scheduled redeploys for Portainer stacks.
//!
//! # Usage
//!
//! ```text
//! pulltainer [run]                 startup pass, then one pass per cron firing
//! pulltainer once [--json]         a single pass, then exit
//! pulltainer next [--count <N>]    upcoming firings of the cron expression
//! ```
//!
//! Every setting is read from a `PULLTAINER_*` environment variable and can
//! be overridden by the matching flag.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{config::ConfigArgs, next::NextArgs, once::OnceArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "pulltainer",
    version,
    about = "Redeploy running Portainer stacks on a cron schedule",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run in the foreground: one pass now, then one per cron firing (default).
    Run,

    /// Run a single reconciliation pass and print what happened to each stack.
    Once(OnceArgs),

    /// Print the next firings of the cron expression.
    Next(NextArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::run(&cli.config),
        Commands::Once(args) => args.run(&cli.config),
        Commands::Next(args) => args.run(&cli.config),
    }
}
