//! `triescrow`: drive a three-party escrow from the command line.
//!
//! ```text
//! triescrow replay demos/release_cycle.json
//! RUST_LOG=debug triescrow replay demos/refund_cycle.json --json-logs
//! triescrow check-config escrow.json
//! ```
//!
//! Step outcomes go to stdout as JSON lines; logs go to stderr.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use triescrow_types::{EscrowConfig, constants};

mod scenario;

use scenario::Scenario;

#[derive(Parser)]
#[command(name = "triescrow")]
#[command(version = constants::VERSION)]
#[command(about = "Three-party escrow: buyer, seller and arbiter jointly custody one deposit")]
struct Cli {
    /// Emit logs as JSON instead of human-readable text
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file against a fresh in-memory escrow
    Replay {
        /// Path to the scenario JSON
        path: PathBuf,
        /// Pretty-print the output instead of one JSON object per line
        #[arg(long)]
        pretty: bool,
    },
    /// Validate an escrow configuration file
    CheckConfig {
        /// Path to the config JSON
        path: PathBuf,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Commands::Replay { path, pretty } => {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("reading scenario {}", path.display()))?;
            let scenario = Scenario::from_json_str(&json)
                .with_context(|| format!("parsing scenario {}", path.display()))?;
            tracing::info!(
                engine = constants::ENGINE_NAME,
                asset = %scenario.config.asset,
                steps = scenario.steps.len(),
                "Replaying scenario"
            );

            let replay = scenario.replay()?;
            if pretty {
                println!("{}", serde_json::to_string_pretty(&replay)?);
            } else {
                for outcome in &replay.outcomes {
                    println!("{}", serde_json::to_string(outcome)?);
                }
                println!("{}", serde_json::to_string(&replay.final_state)?);
            }
        }
        Commands::CheckConfig { path } => {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path.display()))?;
            let config = EscrowConfig::from_json_str(&json)
                .with_context(|| format!("invalid config {}", path.display()))?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
