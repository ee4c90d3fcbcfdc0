//! Evaluation command implementation.

use crate::commands::CliContext;
use anyhow::{Context, Result};
use cropmask_training::{EvaluationOrchestrator, ModelSource};
use std::path::PathBuf;

const DEFAULT_MODEL_NAME: &str = "Ethiopia_Tigray_2021";

#[derive(clap::Args, Debug)]
pub struct EvaluateArgs {
    /// Model whose checkpoint (<models_dir>/<model_name>.ckpt) is evaluated
    #[arg(long = "model_name", default_value = DEFAULT_MODEL_NAME)]
    pub model_name: String,

    /// Evaluate this checkpoint file instead of the one named by --model_name
    #[arg(long)]
    pub checkpoint: Option<PathBuf>,
}

pub fn execute(ctx: &CliContext, args: EvaluateArgs) -> Result<()> {
    let path = args.checkpoint.unwrap_or_else(|| ctx.checkpoints.path_for(&args.model_name));

    let metrics = EvaluationOrchestrator::new(ctx.pipeline())
        .evaluate(ModelSource::Checkpoint(path.clone()))
        .with_context(|| format!("Failed to evaluate {}", path.display()))?;

    println!("{}", serde_json::to_string_pretty(&metrics)?);
    Ok(())
}
