//! Validate command implementation
//!
//! Checks a batch configuration file against the local filesystem: every
//! entry must parse, every referenced file must exist and be a regular file,
//! scopes and mapping expressions must be well-formed. No server is touched.

use console::Style;

use rollout::error::{Result, RolloutError};
use rollout::params;

use crate::cli::ValidateArgs;

/// Run validate command
pub fn run(args: ValidateArgs) -> Result<()> {
    let entries = params::load_batch_config(&args.config)?;
    let total = entries.len();

    println!("Validating {} from '{}':", entry_count(total), args.config.display());
    println!();

    let mut failed = 0;
    for entry in entries {
        let label = entry.archive.display().to_string();
        match entry.into_parameters().and_then(|p| p.validate()) {
            Ok(()) => {
                println!(
                    "  {} {}",
                    Style::new().green().apply_to("ok"),
                    Style::new().bold().apply_to(&label)
                );
            }
            Err(e) => {
                failed += 1;
                println!(
                    "  {} {}: {}",
                    Style::new().red().apply_to("failed"),
                    Style::new().bold().apply_to(&label),
                    e
                );
            }
        }
    }

    println!();
    if failed > 0 {
        return Err(RolloutError::ValidationFailed { failed, total });
    }
    println!("{} valid.", entry_count(total));
    Ok(())
}

fn entry_count(total: usize) -> String {
    match total {
        1 => "1 entry".to_string(),
        _ => format!("{total} entries"),
    }
}
