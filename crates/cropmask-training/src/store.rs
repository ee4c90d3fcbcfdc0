use crate::dataset::DatasetHandle;
use crate::error::{TrainingError, TrainingResult};
use cropmask_abstraction::LabeledRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Source of ground-truth records for a dataset handle.
pub trait LabelStore: Send + Sync {
    /// Every record of the dataset, unfiltered, with `dataset` set to the
    /// handle's name.
    fn load(&self, dataset: &DatasetHandle) -> TrainingResult<Vec<LabeledRecord>>;
}

/// Records stored one JSON object per line under a root directory.
///
/// A handle's `path` is resolved against the root; without one the store
/// reads `<root>/<name>.jsonl`.
#[derive(Debug, Clone)]
pub struct JsonlLabelStore {
    root: PathBuf,
}

impl JsonlLabelStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn path_for(&self, dataset: &DatasetHandle) -> PathBuf {
        match &dataset.path {
            Some(path) => self.root.join(path),
            None => self.root.join(format!("{}.jsonl", dataset.name)),
        }
    }
}

impl LabelStore for JsonlLabelStore {
    fn load(&self, dataset: &DatasetHandle) -> TrainingResult<Vec<LabeledRecord>> {
        let path = self.path_for(dataset);
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            TrainingError::Dataset(format!("failed to read labels for {} from {}: {}", dataset.name, path.display(), e))
        })?;

        let mut records = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut record: LabeledRecord = serde_json::from_str(line).map_err(|e| {
                TrainingError::Dataset(format!("failed to parse {} line {}: {}", path.display(), idx + 1, e))
            })?;
            record.dataset.clone_from(&dataset.name);
            records.push(record);
        }

        Ok(records)
    }
}

/// Write records in the format `JsonlLabelStore` reads.
pub fn write_jsonl_records(path: &Path, records: &[LabeledRecord]) -> TrainingResult<()> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, out)?;
    Ok(())
}

/// Records held in memory, keyed by dataset name. Unknown datasets load as empty.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLabelStore {
    records: HashMap<String, Vec<LabeledRecord>>,
}

impl InMemoryLabelStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_records(mut self, dataset: impl Into<String>, records: Vec<LabeledRecord>) -> Self {
        self.records.insert(dataset.into(), records);
        self
    }
}

impl LabelStore for InMemoryLabelStore {
    fn load(&self, dataset: &DatasetHandle) -> TrainingResult<Vec<LabeledRecord>> {
        let mut records = self.records.get(&dataset.name).cloned().unwrap_or_default();
        for record in &mut records {
            record.dataset.clone_from(&dataset.name);
        }
        Ok(records)
    }
}
