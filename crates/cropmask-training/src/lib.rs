//! Cropmask Training
//!
//! Orchestration for training and evaluating crop classifiers:
//! - Region and dataset registries loaded from a TOML catalog
//! - Hyperparameter resolution, including model-declared parameters
//! - Corpus assembly over a bounding box and time window
//! - Checkpoint persistence keyed by model name
//! - Training and evaluation orchestrators

pub mod assembly;
pub mod catalog;
pub mod checkpoint;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod geo;
pub mod hparams;
pub mod layout;
pub mod progress;
pub mod region;
pub mod registry;
pub mod store;
pub mod trainer;
pub mod window;

pub use assembly::{assemble_corpus, CorpusFilter, ERA5_FEATURE_SOURCE};
pub use catalog::{Catalog, CatalogDefaults};
pub use checkpoint::{sha256_hex, CheckpointHeader, CheckpointStore, CHECKPOINT_FORMAT_VERSION};
pub use dataset::{DatasetHandle, DatasetRegistry, DatasetSelection};
pub use error::{TrainingError, TrainingResult};
pub use evaluator::{EvaluationOrchestrator, ModelSource};
pub use geo::{BoundingBox, BoundsOverride};
pub use hparams::{
    check_extension, HyperparameterResolver, Hyperparameters, PipelineArgs, DEFAULT_INPUT_MONTHS,
    DEFAULT_START_MONTH, DEFAULT_UP_TO_YEAR, PIPELINE_FIELDS,
};
pub use layout::{TrainingLayout, CHECKPOINT_EXTENSION};
pub use progress::{NoopProgressSink, ProgressEvent, ProgressSink, RecordingProgressSink, TracingProgressSink};
pub use region::RegionRegistry;
pub use registry::{discover_checkpoints, CheckpointEntry};
pub use store::{write_jsonl_records, InMemoryLabelStore, JsonlLabelStore, LabelStore};
pub use trainer::{PipelineContext, TrainedModel, TrainingOrchestrator, TrainingOutcome};
pub use window::{parse_month, TimeWindow};
