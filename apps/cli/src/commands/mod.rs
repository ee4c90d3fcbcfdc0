//! Command implementations and the state they share.

pub mod evaluate;
pub mod list;
pub mod train;

use crate::config::CliConfig;
use anyhow::{Context, Result};
use cropmask_abstraction::ModelComponent;
use cropmask_training::{Catalog, CheckpointStore, JsonlLabelStore, PipelineContext, TrainingLayout};
use std::path::Path;
use tracing::debug;

/// Catalog used when neither `--catalog`, the config file nor ./catalog.toml supply one.
const BUILTIN_CATALOG: &str = include_str!("../../assets/catalog.toml");
const LOCAL_CATALOG: &str = "catalog.toml";

/// Registries, label store, checkpoint store and model for one invocation.
pub struct CliContext {
    pub catalog: Catalog,
    pub store: JsonlLabelStore,
    pub checkpoints: CheckpointStore,
    pub component: Box<dyn ModelComponent>,
}

impl CliContext {
    pub fn new(config: &CliConfig, catalog_path: Option<&Path>, component: Box<dyn ModelComponent>) -> Result<Self> {
        Ok(Self {
            catalog: load_catalog(catalog_path)?,
            store: JsonlLabelStore::new(config.datasets_dir()),
            checkpoints: checkpoint_store(config),
            component,
        })
    }

    pub fn pipeline(&self) -> PipelineContext<'_> {
        PipelineContext {
            catalog: &self.catalog,
            store: &self.store,
            component: self.component.as_ref(),
            checkpoints: &self.checkpoints,
        }
    }
}

pub fn checkpoint_store(config: &CliConfig) -> CheckpointStore {
    CheckpointStore::new(TrainingLayout::new(config.models_dir()))
}

fn load_catalog(explicit: Option<&Path>) -> Result<Catalog> {
    if let Some(path) = explicit {
        return Catalog::load(path).with_context(|| format!("Failed to load catalog {}", path.display()));
    }

    let local = Path::new(LOCAL_CATALOG);
    if local.is_file() {
        debug!(path = LOCAL_CATALOG, "Using workspace catalog");
        return Catalog::load(local).context("Failed to load ./catalog.toml");
    }

    debug!("Using built-in catalog");
    Catalog::from_toml_str(BUILTIN_CATALOG).context("Built-in catalog is invalid")
}
