//! Checkpoint listing.

use anyhow::{Context, Result};
use colored::Colorize;
use cropmask_training::{discover_checkpoints, CheckpointStore};
use serde_json::json;

pub fn execute(store: &CheckpointStore, json_output: bool) -> Result<()> {
    let layout = store.layout();
    let entries = discover_checkpoints(layout).context("Failed to discover checkpoints")?;

    if json_output {
        let out: Vec<_> = entries
            .iter()
            .map(|e| {
                json!({
                    "model_name": e.header.model_name,
                    "model_type": e.header.model_type,
                    "run_id": e.header.run_id,
                    "created_at": e.header.created_at,
                    "checkpoint_path": e.path,
                    "bbox": e.header.bbox.url(),
                    "time_window": e.header.time_window.to_string(),
                    "train_datasets": e.header.hyperparameters.train_datasets,
                    "eval_datasets": e.header.hyperparameters.eval_datasets,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("{}", format!("Checkpoints ({})", entries.len()).bold().cyan());
    println!();

    if entries.is_empty() {
        println!("  {}", format!("No checkpoints in {}.", layout.models_dir().display()).dimmed());
        println!();
        println!("  {}", "Tip: run `cropmask train` to produce one.".dimmed());
        return Ok(());
    }

    println!("{:<28} {:<10} {:<22} {}", "Model", "Type", "Created", "Window");
    println!("{}", "─".repeat(90));
    for entry in entries {
        let header = entry.header;
        println!(
            "{:<28} {:<10} {:<22} {}",
            header.model_name.cyan(),
            header.model_type.dimmed(),
            header.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            header.time_window.to_string().dimmed()
        );
    }
    println!();
    Ok(())
}
