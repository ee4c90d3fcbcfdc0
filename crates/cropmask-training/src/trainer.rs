use crate::assembly::{assemble_corpus, CorpusFilter};
use crate::catalog::Catalog;
use crate::checkpoint::{CheckpointHeader, CheckpointStore, CHECKPOINT_FORMAT_VERSION};
use crate::error::TrainingResult;
use crate::evaluator::{EvaluationOrchestrator, ModelSource};
use crate::geo::BoundingBox;
use crate::hparams::Hyperparameters;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::store::LabelStore;
use crate::window::TimeWindow;
use chrono::Utc;
use cropmask_abstraction::{Classifier, Metrics, ModelComponent};
use std::path::PathBuf;
use tracing::{debug, info};
use uuid::Uuid;

/// Collaborators shared by training and evaluation.
#[derive(Clone, Copy)]
pub struct PipelineContext<'a> {
    pub catalog: &'a Catalog,
    pub store: &'a dyn LabelStore,
    pub component: &'a dyn ModelComponent,
    pub checkpoints: &'a CheckpointStore,
}

/// A fitted classifier together with the run metadata it was trained under.
/// Built either by a training run or by loading a checkpoint.
#[derive(Debug)]
pub struct TrainedModel {
    header: CheckpointHeader,
    classifier: Box<dyn Classifier>,
}

impl TrainedModel {
    pub(crate) fn new(header: CheckpointHeader, classifier: Box<dyn Classifier>) -> Self {
        Self { header, classifier }
    }

    #[must_use]
    pub fn header(&self) -> &CheckpointHeader {
        &self.header
    }

    #[must_use]
    pub fn hyperparameters(&self) -> &Hyperparameters {
        &self.header.hyperparameters
    }

    #[must_use]
    pub fn bbox(&self) -> BoundingBox {
        self.header.bbox
    }

    #[must_use]
    pub fn time_window(&self) -> TimeWindow {
        self.header.time_window
    }

    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.header.run_id
    }

    #[must_use]
    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }
}

#[derive(Debug)]
pub struct TrainingOutcome {
    pub model: TrainedModel,
    pub metrics: Metrics,
    pub checkpoint_path: PathBuf,
}

pub struct TrainingOrchestrator<'a> {
    ctx: PipelineContext<'a>,
    progress: &'a dyn ProgressSink,
}

impl<'a> TrainingOrchestrator<'a> {
    #[must_use]
    pub fn new(ctx: PipelineContext<'a>, progress: &'a dyn ProgressSink) -> Self {
        Self { ctx, progress }
    }

    /// Assemble the training corpus, fit, checkpoint, then evaluate the
    /// in-memory model on the eval selection.
    ///
    /// Every name is resolved before fitting starts. A fit failure leaves any
    /// existing checkpoint for `model_name` untouched.
    pub fn train(&self, hparams: &Hyperparameters) -> TrainingResult<TrainingOutcome> {
        let catalog = self.ctx.catalog;
        let bbox = hparams.effective_bbox(&catalog.regions)?;
        let window = hparams.time_window()?;
        let train_handles = catalog.datasets.resolve_many(hparams.train_datasets.names())?;
        catalog.datasets.resolve_many(hparams.eval_datasets.names())?;

        let run_id = Uuid::new_v4();
        self.progress.on_event(ProgressEvent::Started { run_id, model_name: hparams.model_name.clone() });
        info!(
            model_name = %hparams.model_name,
            model_type = self.ctx.component.model_type(),
            bbox = %bbox,
            window = %window,
            "Resolved run extent"
        );

        let filter = CorpusFilter { bbox, window, skip_era5: hparams.skip_era5 };
        let corpus = assemble_corpus(self.ctx.store, &train_handles, &filter)?;
        self.progress.on_event(ProgressEvent::CorpusAssembled {
            run_id,
            records: corpus.len(),
            datasets: corpus.contributions().len(),
        });

        let classifier = self.ctx.component.fit(&corpus, &hparams.model_params)?;
        debug!(%run_id, "Fit complete");

        let header = CheckpointHeader {
            format_version: CHECKPOINT_FORMAT_VERSION,
            model_name: hparams.model_name.clone(),
            model_type: self.ctx.component.model_type().to_string(),
            run_id,
            created_at: Utc::now(),
            hyperparameters: hparams.clone(),
            bbox,
            time_window: window,
        };
        let state = classifier.save_state()?;
        let checkpoint_path = self.ctx.checkpoints.save(&header, &state)?;
        self.progress.on_event(ProgressEvent::CheckpointWritten { run_id, path: checkpoint_path.clone() });

        let model = TrainedModel::new(header, classifier);
        self.progress.on_event(ProgressEvent::Message { run_id, message: "Evaluating trained model".to_string() });
        let metrics = EvaluationOrchestrator::new(self.ctx).evaluate(ModelSource::InMemory(&model))?;

        self.progress.on_event(ProgressEvent::Finished { run_id });
        Ok(TrainingOutcome { model, metrics, checkpoint_path })
    }
}
