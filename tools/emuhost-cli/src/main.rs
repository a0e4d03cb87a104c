//! Emuhost CLI - exercise emulation session lifecycles
//!
//! # Commands
//!
//! - `emuhost scenario <game>` - Run, lose the surface, get a new one, stop
//! - `emuhost script <game> <steps...>` - Apply arbitrary lifecycle steps
//! - `emuhost config` - Print the effective configuration
//!
//! # Steps
//!
//! `run`, `run-recreated`, `surface:<id>:<w>x<h>`, `lost`, `pause`, `stop`,
//! `wait:<ms>`
//!
//! ```bash
//! RUST_LOG=debug emuhost script game.bin run surface:1:1280x720 pause run stop
//! ```

mod engine;
mod script;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use emuhost_core::{Config, config};

/// Emuhost CLI - drive session lifecycles against a simulated engine
#[derive(Parser)]
#[command(name = "emuhost")]
#[command(about = "Drive emulation session lifecycles against a simulated engine")]
#[command(version)]
struct Cli {
    /// Read configuration from this file instead of the platform config dir
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the canonical run / surface lost / resume scenario
    Scenario {
        /// Content path handed to the engine
        game: String,
    },

    /// Apply lifecycle steps in order
    Script {
        /// Content path handed to the engine
        game: String,

        /// Steps, e.g. run surface:1:1280x720 lost stop
        #[arg(required = true)]
        steps: Vec<String>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => config::load_from(path)
            .with_context(|| format!("could not load {}", path.display())),
        None => Ok(config::load()),
    }
}

fn init_logging(config: &Config) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter)),
        )
        .init();
}

fn print_report(report: &script::ScriptReport) {
    for entry in &report.trail {
        println!("{}", entry);
    }
    for event in &report.events {
        println!("{}", event);
    }
    println!("frames rendered: {}", report.frames);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config);

    match cli.command {
        Commands::Scenario { game } => {
            let report = script::execute(&game, &script::default_scenario(), &config)?;
            print_report(&report);
        }
        Commands::Script { game, steps } => {
            let steps = script::parse_steps(&steps)?;
            let report = script::execute(&game, &steps, &config)?;
            print_report(&report);
        }
        Commands::Config => {
            let text = toml::to_string_pretty(&config).context("could not serialize config")?;
            print!("{}", text);
        }
    }

    Ok(())
}
