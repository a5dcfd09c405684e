//! Command handlers for hmc.

use hm_config::HmConfig;
use hm_core::{Aggregator, HydraApi};

use crate::prelude::*;
use crate::render::{GridTable, MatrixTable};

/// Handles the parse command to display configuration information.
pub fn handle_parse(config: &HmConfig) -> Result<()> {
    println!("Configuration parsed successfully");
    println!("Server: {}", config.server.url);
    println!("Project: {}", config.server.project);
    println!("Base jobset of <branch>: {}", config.base_jobset("<branch>"));

    println!("\nSystems: {}", config.systems.len());
    for system in &config.systems {
        println!("  {system}");
    }
    println!("Variants: {:?}", config.variants);
    println!("Flavours: {}", config.flavours.len());
    for flavour in &config.flavours {
        println!("  {flavour}");
    }
    println!("Outcomes:");
    for (token, glyph) in &config.outcomes {
        println!("  {token} -> {glyph}");
    }
    Ok(())
}

/// Handles the grid command: prints the build-status grid of `branch`.
pub async fn handle_grid(config: HmConfig, branch: &str, json: bool) -> Result<()> {
    let api = HydraApi::from_config(&config)?;
    let aggregator = Aggregator::new(api, config);
    let mut table = GridTable::default();

    let grid = aggregator.render_grid(branch, &mut table).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&grid)?);
    } else if grid.columns.is_empty() {
        println!("No evaluation found for branch {branch}");
    } else {
        print!("{}", table.render());
    }
    Ok(())
}

/// Handles the matrix command: prints the test-result matrix of `branch`.
pub async fn handle_matrix(config: HmConfig, branch: &str, json: bool) -> Result<()> {
    let api = HydraApi::from_config(&config)?;
    let aggregator = Aggregator::new(api, config);
    let mut table = MatrixTable::default();

    let matrix = aggregator.render_matrix(branch, &mut table).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&matrix)?);
    } else if matrix.columns.is_empty() {
        println!("No builds found for branch {branch}");
    } else {
        print!("{}", table.render());
    }
    Ok(())
}
