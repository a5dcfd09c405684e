//! Hydra matrix client (hmc)
//!
//! Queries a Hydra CI server and prints one of two views of a branch:
//!
//! - **Grid**: latest build status of every job on every system and variant
//! - **Matrix**: per-test outcomes of the latest builds of the base variant
//! - **Parse**: the effective configuration
//!
//! Progress is logged to stderr; stdout carries only the rendered view.

mod cli;
mod commands;
mod error;
mod prelude;
mod render;

use clap::Parser;
use cli::{Cli, Commands};
use hm_config::HmConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{handle_grid, handle_matrix, handle_parse};
use crate::prelude::*;

/// Main entry point for hmc.
///
/// ```bash
/// hmc --config hydra-matrix.toml grid --branch master
/// hmc --config hydra-matrix.toml matrix --branch master --json
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hmc=info,hm_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Parse => handle_parse(&config),
        Commands::Grid { branch, json } => handle_grid(config, &branch, json).await,
        Commands::Matrix { branch, json } => handle_matrix(config, &branch, json).await,
    }
}

/// Configuration file with the command-line overrides applied.
fn load_config(cli: &Cli) -> Result<HmConfig> {
    let mut config = HmConfig::from_file(&cli.config)?;
    if let Some(url) = &cli.url {
        config.server.url = url.clone();
    }
    if let Some(project) = &cli.project {
        config.server.project = project.clone();
    }
    config.validate()?;
    Ok(config)
}
