use crate::checkpoint::{CheckpointHeader, CheckpointStore};
use crate::error::TrainingResult;
use crate::layout::{TrainingLayout, CHECKPOINT_EXTENSION};
use std::path::PathBuf;
use tracing::warn;

/// A checkpoint found under the models directory.
#[derive(Debug, Clone)]
pub struct CheckpointEntry {
    pub path: PathBuf,
    pub header: CheckpointHeader,
}

/// Scan `models_dir` for `*.ckpt` files and read their headers, sorted by
/// model name. A missing directory yields no entries; files whose header
/// cannot be read are skipped with a warning.
pub fn discover_checkpoints(layout: &TrainingLayout) -> TrainingResult<Vec<CheckpointEntry>> {
    let mut out = Vec::new();

    let dir = match std::fs::read_dir(layout.models_dir()) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(e.into()),
    };

    let store = CheckpointStore::new(layout.clone());
    for entry in dir {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(CHECKPOINT_EXTENSION) {
            continue;
        }
        match store.load_header(&path) {
            Ok(header) => out.push(CheckpointEntry { path, header }),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable checkpoint"),
        }
    }

    out.sort_by(|a, b| a.header.model_name.cmp(&b.header.model_name));
    Ok(out)
}
