//! Command-line interface for hmc.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface for the hydra-matrix client.
#[derive(Parser)]
#[command(name = "hmc")]
#[command(about = "Hydra matrix - Build status and test results of a branch at a glance")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Override the CI server base URL
    #[arg(short, long)]
    pub url: Option<String>,

    /// Override the CI project
    #[arg(short, long)]
    pub project: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse and display the configuration file
    Parse,

    /// Latest build of every job on every system and variant
    Grid {
        /// Branch to inspect
        #[arg(short, long)]
        branch: String,

        /// Print the grid as JSON
        #[arg(long)]
        json: bool,
    },

    /// Test results of the latest builds of the branch's base variant
    Matrix {
        /// Branch to inspect
        #[arg(short, long)]
        branch: String,

        /// Print the matrix as JSON
        #[arg(long)]
        json: bool,
    },
}
