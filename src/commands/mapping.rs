//! Mapping command implementation
//!
//! Resolves a database-layer mapping table from an expression and a layer
//! inventory file, and prints it. Useful for checking what an expression
//! does to a concrete archive before rolling it out.

use std::fs;

use console::Style;

use rollout::descriptor::LayerInventory;
use rollout::error::{Result, RolloutError};
use rollout::layers;

use crate::cli::MappingArgs;

/// Run mapping command
pub fn run(args: MappingArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.inventory).map_err(|e| RolloutError::FileReadFailed {
        path: args.inventory.display().to_string(),
        reason: e.to_string(),
    })?;
    let inventory: LayerInventory =
        serde_json::from_str(&raw).map_err(|e| RolloutError::InventoryParseFailed {
            path: args.inventory.display().to_string(),
            reason: e.to_string(),
        })?;

    let expression = layers::parse_expression(args.expression.as_deref().unwrap_or(""))?;
    let mapping = layers::resolve(&expression, &inventory.mapped, &inventory.unmapped)?;

    if mapping.is_empty() {
        println!("No source layers.");
        return Ok(());
    }

    println!("Resolved layer mapping:");
    for (source, destination) in &mapping {
        let destination_style = if destination == layers::CREATE_NEW_LAYER {
            Style::new().yellow()
        } else {
            Style::new().green()
        };
        println!(
            "  {} -> {}",
            Style::new().bold().apply_to(source),
            destination_style.apply_to(destination)
        );
    }
    Ok(())
}
