//! plugmetrics CLI - Inspect and simulate embedded usage reporters
//!
//! Provides commands for:
//! - Showing the shared reporter config
//! - Printing the snapshot a set of plugins would submit
//! - Running simulated plugins against a collector

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{config::ConfigCommand, run::RunCommand, snapshot::SnapshotCommand};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "plugmetrics", version, about = "Opt-in plugin usage reporter")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// View the shared reporter configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print the snapshot simulated plugins would submit
    Snapshot(SnapshotCommand),
    /// Run simulated plugins and submit until interrupted
    Run(RunCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = OutputFormat::from_json_flag(cli.json);

    match cli.command {
        Commands::Config(cmd) => cmd.execute(format).await,
        Commands::Snapshot(cmd) => cmd.execute(format).await,
        Commands::Run(cmd) => cmd.execute(format).await,
    }
}
