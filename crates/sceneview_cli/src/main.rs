//! SceneView CLI
//!
//! Replays scripted touch scenarios against the manipulation controllers in
//! a simulated AR session, and prints the effective configuration.

mod config;
mod replay;
mod scenario;
mod sim;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::scenario::Scenario;

#[derive(Parser, Debug)]
#[command(name = "sceneview")]
#[command(about = "Replay touch scenarios against SceneView's manipulation controllers")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a scenario file and report where the model ended up
    Replay {
        /// Scenario TOML file
        scenario: PathBuf,

        /// Configuration file (defaults to ./sceneview.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Configuration file (defaults to ./sceneview.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir()?;
    match cli.command {
        Commands::Replay {
            scenario,
            config,
            json,
        } => {
            let config = config::load_config(config.as_deref(), &cwd)?;
            let loaded = Scenario::load(&scenario)?;
            info!("Replaying {} ({} steps)", scenario.display(), loaded.steps.len());

            let report = replay::replay(&loaded, config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
            }
        }
        Commands::Config { config } => {
            let config = config::load_config(config.as_deref(), &cwd)?;
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
