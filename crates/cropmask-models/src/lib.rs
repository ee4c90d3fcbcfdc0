//! Crop classifiers implementing the `cropmask-abstraction` contracts.

pub mod logistic;

pub use logistic::{LogisticClassifier, LogisticCropModel, LOGISTIC_MODEL_TYPE};

use cropmask_abstraction::ModelComponent;

/// Look up a model component by its `model_type`.
#[must_use]
pub fn component_for(model_type: &str) -> Option<Box<dyn ModelComponent>> {
    match model_type {
        LOGISTIC_MODEL_TYPE => Some(Box::new(LogisticCropModel::new())),
        _ => None,
    }
}

#[must_use]
pub fn default_component() -> Box<dyn ModelComponent> {
    Box::new(LogisticCropModel::new())
}
