use crate::assembly::{assemble_corpus, CorpusFilter};
use crate::error::{TrainingError, TrainingResult};
use crate::trainer::{PipelineContext, TrainedModel};
use cropmask_abstraction::Metrics;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug)]
pub enum ModelSource<'m> {
    Checkpoint(PathBuf),
    InMemory(&'m TrainedModel),
}

/// Computes metrics for a trained model on the eval selection it was trained
/// with. Bbox, window and `skip_era5` always come from the model itself.
pub struct EvaluationOrchestrator<'a> {
    ctx: PipelineContext<'a>,
}

impl<'a> EvaluationOrchestrator<'a> {
    #[must_use]
    pub fn new(ctx: PipelineContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn evaluate(&self, source: ModelSource<'_>) -> TrainingResult<Metrics> {
        match source {
            ModelSource::InMemory(model) => self.evaluate_model(model),
            ModelSource::Checkpoint(path) => {
                let model = self.load(&path)?;
                self.evaluate_model(&model)
            }
        }
    }

    /// Evaluate the checkpoint stored for `model_name`.
    pub fn evaluate_by_name(&self, model_name: &str) -> TrainingResult<Metrics> {
        self.evaluate(ModelSource::Checkpoint(self.ctx.checkpoints.path_for(model_name)))
    }

    /// Restore a model from a checkpoint written by a component of the same type.
    pub fn load(&self, path: &Path) -> TrainingResult<TrainedModel> {
        let (header, state) = self.ctx.checkpoints.load(path)?;

        let expected = self.ctx.component.model_type();
        if header.model_type != expected {
            return Err(TrainingError::corrupt(
                path,
                format!("model_type '{}' does not match component '{}'", header.model_type, expected),
            ));
        }

        let classifier = self
            .ctx
            .component
            .load_state(&state)
            .map_err(|e| TrainingError::corrupt(path, e.to_string()))?;
        debug!(model_name = %header.model_name, run_id = %header.run_id, "Restored model from checkpoint");
        Ok(TrainedModel::new(header, classifier))
    }

    fn evaluate_model(&self, model: &TrainedModel) -> TrainingResult<Metrics> {
        let hparams = model.hyperparameters();
        let handles = self.ctx.catalog.datasets.resolve_many(hparams.eval_datasets.names())?;
        let filter = CorpusFilter { bbox: model.bbox(), window: model.time_window(), skip_era5: hparams.skip_era5 };
        let corpus = assemble_corpus(self.ctx.store, &handles, &filter)?;

        let classifier = model.classifier();
        let mut metrics = classifier.evaluate(&corpus)?;
        for (dataset, _) in corpus.contributions() {
            let per_dataset = classifier.evaluate(&corpus.dataset_subset(dataset))?;
            metrics.merge_prefixed(dataset, &per_dataset);
        }

        info!(model_name = %hparams.model_name, records = corpus.len(), "Evaluation complete");
        Ok(metrics)
    }
}
