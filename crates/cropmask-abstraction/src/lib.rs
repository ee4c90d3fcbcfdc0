//! Model abstraction layer for cropmask.
//!
//! This crate defines the contracts between the training/evaluation orchestration
//! and the crop classification models it drives:
//! - `ModelComponent`: declares extra hyperparameters, fits and restores models
//! - `Classifier`: a fitted model that scores records and serializes its state
//! - the data handed across that seam (`Corpus`, `LabeledRecord`, `Metrics`)

pub mod corpus;
pub mod metrics;
pub mod params;

pub use corpus::{Corpus, LabeledRecord};
pub use metrics::{binary_classification_metrics, Metrics};
pub use params::{ModelParams, ParamValue};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Represents an error raised by a model component while fitting, scoring or
/// restoring state.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelError {
    /// The corpus handed to `fit` contained no records.
    #[error("corpus has no records to fit on")]
    EmptyCorpus,

    /// A model parameter is missing, has the wrong type, or is out of range.
    #[error("invalid model parameter '{name}': {reason}")]
    InvalidParam {
        /// Parameter name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Serialized state could not be restored.
    #[error("invalid model state: {0}")]
    InvalidState(String),

    /// Fitting diverged or otherwise failed.
    #[error("fit failed: {0}")]
    Fit(String),

    /// Other unexpected errors.
    #[error("model error: {0}")]
    Other(String),
}

/// Result type for model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// A fitted crop classifier.
pub trait Classifier: fmt::Debug + Send + Sync {
    /// Identifier of the component that produced this classifier.
    fn model_type(&self) -> &'static str;

    /// Probability in `[0, 1]` that the record is cropland.
    fn predict(&self, record: &LabeledRecord) -> ModelResult<f64>;

    /// Probability above which a record is labelled cropland.
    fn threshold(&self) -> f64 {
        0.5
    }

    /// Serialize the fitted state. `ModelComponent::load_state` must accept
    /// these bytes and rebuild a classifier with identical predictions.
    fn save_state(&self) -> ModelResult<Vec<u8>>;

    /// Score every record of `corpus` and summarize as binary metrics.
    fn evaluate(&self, corpus: &Corpus) -> ModelResult<Metrics> {
        let mut labels = Vec::with_capacity(corpus.len());
        let mut scores = Vec::with_capacity(corpus.len());
        for record in corpus.records() {
            labels.push(record.is_crop);
            scores.push(self.predict(record)?);
        }
        Ok(binary_classification_metrics(&labels, &scores, self.threshold()))
    }
}

/// A model implementation pluggable into the training pipeline.
pub trait ModelComponent: Send + Sync {
    /// Stable identifier recorded in checkpoints (e.g. "logistic").
    fn model_type(&self) -> &'static str;

    /// Additional hyperparameters this model understands, with their defaults.
    ///
    /// Names must not collide with pipeline fields; the resolver rejects
    /// collisions before anything else runs.
    fn declare_params(&self) -> ModelParams;

    /// Fit a classifier on `corpus` using the merged model parameters.
    fn fit(&self, corpus: &Corpus, params: &ModelParams) -> ModelResult<Box<dyn Classifier>>;

    /// Restore a classifier from bytes produced by `Classifier::save_state`.
    fn load_state(&self, bytes: &[u8]) -> ModelResult<Box<dyn Classifier>>;
}
