use crate::error::TrainingResult;
use std::path::{Path, PathBuf};

pub const CHECKPOINT_EXTENSION: &str = "ckpt";

/// Filesystem layout for checkpoints.
///
/// Default layout is `<workspace>/data/models/<model_name>.ckpt`.
#[derive(Debug, Clone)]
pub struct TrainingLayout {
    models_dir: PathBuf,
}

impl TrainingLayout {
    #[must_use]
    pub fn new(models_dir: PathBuf) -> Self {
        Self { models_dir }
    }

    /// Create a layout rooted in a workspace directory.
    #[must_use]
    pub fn for_workspace_root(workspace_root: &Path) -> Self {
        Self::new(workspace_root.join("data").join("models"))
    }

    #[must_use]
    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    #[must_use]
    pub fn checkpoint_path(&self, model_name: &str) -> PathBuf {
        self.models_dir.join(format!("{model_name}.{CHECKPOINT_EXTENSION}"))
    }

    /// Staging file renamed over the checkpoint once fully written.
    #[must_use]
    pub fn staging_path(&self, model_name: &str) -> PathBuf {
        self.models_dir.join(format!(".{model_name}.{CHECKPOINT_EXTENSION}.tmp"))
    }

    pub fn ensure_dirs(&self) -> TrainingResult<()> {
        std::fs::create_dir_all(&self.models_dir)?;
        Ok(())
    }
}
