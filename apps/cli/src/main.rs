//! cropmask CLI - train and evaluate crop classification models
//!
//! Provides the `cropmask` command: `train` fits a model over a region and
//! time window and saves its checkpoint, `evaluate` scores a saved checkpoint,
//! `list` shows the checkpoints in the models directory.

mod commands;
mod config;

use anyhow::{Context, Result};
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use cropmask_training::check_extension;
use std::path::PathBuf;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

use commands::{evaluate, list, train};

/// Flag ids every subcommand accepts. Model-declared parameters may not reuse them.
const GLOBAL_FLAGS: &[&str] = &["log_level", "workspace", "catalog", "help", "version"];

/// cropmask - crop/non-crop classification over named regions
#[derive(Parser, Debug)]
#[command(
    name = "cropmask",
    author,
    version,
    about = "Train and evaluate crop classification models over named regions and datasets"
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Workspace directory (overrides CROPMASK_WORKSPACE)
    #[arg(short = 'w', long, global = true)]
    workspace: Option<PathBuf>,

    /// Catalog TOML with regions, datasets and defaults
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a model, save its checkpoint and print evaluation metrics
    ///
    /// Prints the bboxfinder URL of the effective bounding box, then the
    /// metrics as JSON. Model-specific parameters appear under their own
    /// heading in `--help`.
    Train(train::TrainArgs),

    /// Evaluate a saved checkpoint on the datasets it was trained to report on
    Evaluate(evaluate::EvaluateArgs),

    /// List saved checkpoints
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let component = cropmask_models::default_component();
    let declared = component.declare_params();
    check_extension(&declared, GLOBAL_FLAGS).context("Model parameters cannot be exposed as flags")?;

    let matches = train::register_model_args(Args::command(), &declared).get_matches();
    let args = Args::from_arg_matches(&matches)?;

    let cli_config = config::CliConfig::discover_and_load();

    let level = match args.log_level.as_deref().or(cli_config.log_level.as_deref()).unwrap_or("info") {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // CLI arg takes precedence over CROPMASK_WORKSPACE and config
    let workspace = match args.workspace.as_ref().or(cli_config.workspace.as_ref()) {
        Some(workspace) => workspace.clone(),
        None => {
            let home = config::CliConfig::default_workspace()
                .context("Cannot locate the cropmask home; pass -w or set CROPMASK_WORKSPACE")?;
            std::fs::create_dir_all(&home).with_context(|| format!("Failed to create {}", home.display()))?;
            home
        }
    };
    std::env::set_current_dir(&workspace)
        .with_context(|| format!("Failed to enter workspace {}", workspace.display()))?;
    debug!(workspace = %workspace.display(), "Using workspace");

    let catalog_path = args.catalog.clone().or_else(|| cli_config.catalog.clone());

    match args.command {
        Command::Train(train_args) => {
            let overrides = train::model_overrides(&matches, &declared);
            let ctx = commands::CliContext::new(&cli_config, catalog_path.as_deref(), component)?;
            train::execute(&ctx, train_args, overrides)
        }
        Command::Evaluate(evaluate_args) => {
            let ctx = commands::CliContext::new(&cli_config, catalog_path.as_deref(), component)?;
            evaluate::execute(&ctx, evaluate_args)
        }
        Command::List { json } => list::execute(&commands::checkpoint_store(&cli_config), json),
    }
}
