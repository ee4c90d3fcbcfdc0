use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Started { run_id: Uuid, model_name: String },
    CorpusAssembled { run_id: Uuid, records: usize, datasets: usize },
    Message { run_id: Uuid, message: String },
    CheckpointWritten { run_id: Uuid, path: PathBuf },
    Finished { run_id: Uuid },
}

pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

/// Forwards events to `tracing` at info level.
#[derive(Debug, Default)]
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { run_id, model_name } => info!(%run_id, %model_name, "Training started"),
            ProgressEvent::CorpusAssembled { run_id, records, datasets } => {
                info!(%run_id, records, datasets, "Training corpus assembled");
            }
            ProgressEvent::Message { run_id, message } => info!(%run_id, "{message}"),
            ProgressEvent::CheckpointWritten { run_id, path } => {
                info!(%run_id, path = %path.display(), "Checkpoint saved");
            }
            ProgressEvent::Finished { run_id } => info!(%run_id, "Training finished"),
        }
    }
}

#[derive(Debug, Default)]
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn on_event(&self, _event: ProgressEvent) {}
}

/// Keeps every event; used by tests and embedders that report after the run.
#[derive(Debug, Default)]
pub struct RecordingProgressSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgressSink {
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl ProgressSink for RecordingProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
