use crate::error::{TrainingError, TrainingResult};
use crate::geo::BoundingBox;
use crate::hparams::Hyperparameters;
use crate::layout::TrainingLayout;
use crate::window::TimeWindow;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

pub const CHECKPOINT_FORMAT_VERSION: u32 = 1;

/// Everything about a training run the evaluation path needs besides the
/// model's own state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointHeader {
    pub format_version: u32,
    pub model_name: String,
    pub model_type: String,
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub hyperparameters: Hyperparameters,
    /// Effective box the run was trained on.
    pub bbox: BoundingBox,
    pub time_window: TimeWindow,
}

#[derive(Debug, Serialize, Deserialize)]
struct CheckpointEnvelope {
    header: CheckpointHeader,
    /// Base64 of the model-owned state bytes.
    state: String,
    state_sha256: String,
}

/// Header-only view; serde skips the state payload.
#[derive(Debug, Deserialize)]
struct HeaderView {
    header: CheckpointHeader,
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Reads and writes `<models_dir>/<model_name>.ckpt` envelopes.
///
/// Writes go to a staging file first and are renamed into place, so a reader
/// sees either the previous checkpoint or the complete new one. A second run
/// with the same model name replaces the first.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    layout: TrainingLayout,
}

impl CheckpointStore {
    #[must_use]
    pub fn new(layout: TrainingLayout) -> Self {
        Self { layout }
    }

    #[must_use]
    pub fn layout(&self) -> &TrainingLayout {
        &self.layout
    }

    #[must_use]
    pub fn path_for(&self, model_name: &str) -> PathBuf {
        self.layout.checkpoint_path(model_name)
    }

    pub fn save(&self, header: &CheckpointHeader, state: &[u8]) -> TrainingResult<PathBuf> {
        self.layout.ensure_dirs()?;

        let envelope = CheckpointEnvelope {
            header: header.clone(),
            state: BASE64.encode(state),
            state_sha256: sha256_hex(state),
        };
        let json = serde_json::to_vec_pretty(&envelope)?;

        let staging = self.layout.staging_path(&header.model_name);
        let target = self.layout.checkpoint_path(&header.model_name);
        if let Err(e) = std::fs::write(&staging, &json).and_then(|()| std::fs::rename(&staging, &target)) {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }

        info!(model_name = %header.model_name, run_id = %header.run_id, path = %target.display(), "Checkpoint written");
        Ok(target)
    }

    /// Load header and verified state bytes.
    pub fn load(&self, path: &Path) -> TrainingResult<(CheckpointHeader, Vec<u8>)> {
        let bytes = read_existing(path)?;
        let envelope: CheckpointEnvelope =
            serde_json::from_slice(&bytes).map_err(|e| TrainingError::corrupt(path, e.to_string()))?;
        check_version(path, &envelope.header)?;

        let state = BASE64
            .decode(envelope.state.as_bytes())
            .map_err(|e| TrainingError::corrupt(path, format!("state is not valid base64: {e}")))?;
        let digest = sha256_hex(&state);
        if digest != envelope.state_sha256 {
            return Err(TrainingError::corrupt(
                path,
                format!("state checksum mismatch (expected {}, got {})", envelope.state_sha256, digest),
            ));
        }

        debug!(path = %path.display(), run_id = %envelope.header.run_id, "Checkpoint loaded");
        Ok((envelope.header, state))
    }

    /// Load only the header, without decoding the state.
    pub fn load_header(&self, path: &Path) -> TrainingResult<CheckpointHeader> {
        let bytes = read_existing(path)?;
        let view: HeaderView =
            serde_json::from_slice(&bytes).map_err(|e| TrainingError::corrupt(path, e.to_string()))?;
        check_version(path, &view.header)?;
        Ok(view.header)
    }
}

/// Anything present at `path` that cannot be read as a file is corrupt.
fn read_existing(path: &Path) -> TrainingResult<Vec<u8>> {
    if path.is_dir() {
        return Err(TrainingError::corrupt(path, "is a directory, not a checkpoint file"));
    }
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(TrainingError::CheckpointNotFound(path.to_path_buf())),
        Err(e) => Err(TrainingError::corrupt(path, format!("unreadable: {e}"))),
    }
}

fn check_version(path: &Path, header: &CheckpointHeader) -> TrainingResult<()> {
    if header.format_version == CHECKPOINT_FORMAT_VERSION {
        Ok(())
    } else {
        Err(TrainingError::corrupt(
            path,
            format!("unsupported format_version {} (expected {})", header.format_version, CHECKPOINT_FORMAT_VERSION),
        ))
    }
}
