//! Hyperparameter resolution: pipeline arguments merged with the fields a
//! model component declares for itself.

use crate::catalog::Catalog;
use crate::dataset::DatasetSelection;
use crate::error::{TrainingError, TrainingResult};
use crate::geo::{BoundingBox, BoundsOverride};
use crate::region::RegionRegistry;
use crate::window::{parse_month, TimeWindow};
use cropmask_abstraction::{ModelComponent, ModelParams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Field names owned by the pipeline. Model-declared parameters may not reuse them.
pub const PIPELINE_FIELDS: &[&str] = &[
    "model_name",
    "train_datasets",
    "eval_datasets",
    "region",
    "min_lat",
    "max_lat",
    "min_lon",
    "max_lon",
    "up_to_year",
    "start_month",
    "input_months",
    "skip_era5",
];

pub const DEFAULT_UP_TO_YEAR: i32 = 2022;
pub const DEFAULT_START_MONTH: &str = "February";
pub const DEFAULT_INPUT_MONTHS: u32 = 12;

/// Raw pipeline inputs as supplied by a caller; `None` means "use the default".
#[derive(Debug, Clone, Default)]
pub struct PipelineArgs {
    pub model_name: Option<String>,
    /// Comma-separated dataset names.
    pub train_datasets: Option<String>,
    /// Comma-separated dataset names.
    pub eval_datasets: Option<String>,
    pub region: Option<String>,
    pub bounds: BoundsOverride,
    pub up_to_year: Option<i32>,
    pub start_month: Option<String>,
    pub input_months: Option<u32>,
    pub skip_era5: bool,
    /// Unparsed values for model-declared parameters.
    pub model_overrides: BTreeMap<String, String>,
}

/// The full, validated configuration of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub model_name: String,
    pub train_datasets: DatasetSelection,
    pub eval_datasets: DatasetSelection,
    /// Region whose box supplies the bounds not overridden below.
    pub region: String,
    #[serde(flatten)]
    pub bounds: BoundsOverride,
    pub up_to_year: i32,
    pub start_month: String,
    pub input_months: u32,
    pub skip_era5: bool,
    pub model_params: ModelParams,
}

impl Hyperparameters {
    /// Region default with explicit bounds applied field by field.
    pub fn effective_bbox(&self, regions: &RegionRegistry) -> TrainingResult<BoundingBox> {
        let base = regions.resolve(&self.region)?;
        self.bounds.apply(&base)
    }

    pub fn time_window(&self) -> TrainingResult<TimeWindow> {
        TimeWindow::new(self.up_to_year, parse_month(&self.start_month)?, self.input_months)
    }
}

/// Reject model-declared names that shadow a pipeline field or one of the
/// caller's `reserved` names. `-` and `_` are treated alike, and every
/// collision is reported, so the outcome does not depend on declaration order.
pub fn check_extension(params: &ModelParams, reserved: &[&str]) -> TrainingResult<()> {
    let normalize = |name: &str| name.trim().replace('-', "_");
    let taken: Vec<String> = PIPELINE_FIELDS.iter().chain(reserved).map(|n| normalize(*n)).collect();

    let mut collisions: Vec<&str> = params.names().filter(|name| taken.contains(&normalize(*name))).collect();
    if collisions.is_empty() {
        return Ok(());
    }
    collisions.sort_unstable();
    Err(TrainingError::config(format!(
        "model parameters collide with pipeline fields: {}",
        collisions.join(", ")
    )))
}

/// Builds `Hyperparameters` from `PipelineArgs`, catalog defaults and the
/// model's declared parameters.
#[derive(Debug, Clone, Copy)]
pub struct HyperparameterResolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> HyperparameterResolver<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Validation that needs neither a region lookup nor I/O runs first;
    /// the effective box is checked last.
    pub fn resolve(&self, args: PipelineArgs, component: &dyn ModelComponent) -> TrainingResult<Hyperparameters> {
        let declared = component.declare_params();
        check_extension(&declared, &[])?;
        let model_params = merge_model_params(declared, &args.model_overrides)?;

        args.bounds.validate_explicit()?;

        let up_to_year = args.up_to_year.unwrap_or(DEFAULT_UP_TO_YEAR);
        let input_months = args.input_months.unwrap_or(DEFAULT_INPUT_MONTHS);
        let month = parse_month(args.start_month.as_deref().unwrap_or(DEFAULT_START_MONTH))?;
        TimeWindow::new(up_to_year, month, input_months)?;

        let defaults = &self.catalog.defaults;
        let model_name = args
            .model_name
            .or_else(|| defaults.model_name.clone())
            .ok_or_else(|| TrainingError::config("model_name is required"))?;
        validate_model_name(&model_name)?;

        let train_datasets = args
            .train_datasets
            .map_or_else(|| defaults.train_datasets.clone(), |s| DatasetSelection::parse(&s));
        let eval_datasets = args
            .eval_datasets
            .map_or_else(|| defaults.eval_datasets.clone(), |s| DatasetSelection::parse(&s));
        if train_datasets.is_empty() {
            return Err(TrainingError::config("train_datasets must name at least one dataset"));
        }
        if eval_datasets.is_empty() {
            return Err(TrainingError::config("eval_datasets must name at least one dataset"));
        }

        let region = args
            .region
            .or_else(|| defaults.region.clone())
            .ok_or_else(|| TrainingError::config("region is required: none given and the catalog has no default"))?;

        let hparams = Hyperparameters {
            model_name,
            train_datasets,
            eval_datasets,
            region,
            bounds: args.bounds,
            up_to_year,
            start_month: month.name().to_string(),
            input_months,
            skip_era5: args.skip_era5,
            model_params,
        };

        let bbox = hparams.effective_bbox(&self.catalog.regions)?;
        debug!(model_name = %hparams.model_name, bbox = %bbox, "Resolved hyperparameters");
        Ok(hparams)
    }
}

fn merge_model_params(declared: ModelParams, overrides: &BTreeMap<String, String>) -> TrainingResult<ModelParams> {
    let mut merged = declared;
    for (name, raw) in overrides {
        let default = merged
            .get(name)
            .ok_or_else(|| TrainingError::config(format!("unknown model parameter '{name}'")))?;
        let value = default.parse_like(name, raw).map_err(|e| TrainingError::config(e.to_string()))?;
        merged.insert(name.clone(), value);
    }
    Ok(merged)
}

/// Model names address checkpoint files, so they must be a single path component.
fn validate_model_name(name: &str) -> TrainingResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TrainingError::config("model_name must not be empty"));
    }
    if trimmed != name || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(TrainingError::config(format!("model_name '{name}' is not a valid file name")));
    }
    Ok(())
}
