//! Training command implementation.

use crate::commands::CliContext;
use anyhow::{Context, Result};
use clap::parser::ValueSource;
use clap::{Arg, ArgMatches};
use cropmask_abstraction::{ModelParams, ParamValue};
use cropmask_training::{
    BoundsOverride, HyperparameterResolver, PipelineArgs, TracingProgressSink, TrainingOrchestrator,
    DEFAULT_INPUT_MONTHS, DEFAULT_START_MONTH, DEFAULT_UP_TO_YEAR,
};
use std::collections::BTreeMap;

const TRAIN_COMMAND: &str = "train";
const MODEL_HEADING: &str = "Model parameters";

#[derive(clap::Args, Debug)]
pub struct TrainArgs {
    /// Name the checkpoint is saved under (default: catalog default)
    #[arg(long = "model_name")]
    pub model_name: Option<String>,

    /// Comma-separated datasets to evaluate on (default: catalog default)
    #[arg(long = "eval_datasets")]
    pub eval_datasets: Option<String>,

    /// Comma-separated datasets to train on (default: catalog default)
    #[arg(long = "train_datasets")]
    pub train_datasets: Option<String>,

    /// Region supplying the default bounding box (default: catalog default)
    #[arg(long)]
    pub region: Option<String>,

    /// Southern bound, overrides the region's
    #[arg(long = "min_lat", allow_negative_numbers = true)]
    pub min_lat: Option<f64>,

    /// Northern bound, overrides the region's
    #[arg(long = "max_lat", allow_negative_numbers = true)]
    pub max_lat: Option<f64>,

    /// Western bound, overrides the region's
    #[arg(long = "min_lon", allow_negative_numbers = true)]
    pub min_lon: Option<f64>,

    /// Eastern bound, overrides the region's
    #[arg(long = "max_lon", allow_negative_numbers = true)]
    pub max_lon: Option<f64>,

    /// Last year of input data
    #[arg(long = "up_to_year", default_value_t = DEFAULT_UP_TO_YEAR)]
    pub up_to_year: i32,

    /// Month the input window starts in
    #[arg(long = "start_month", default_value = DEFAULT_START_MONTH)]
    pub start_month: String,

    /// Length of the input window in months
    #[arg(long = "input_months", default_value_t = DEFAULT_INPUT_MONTHS)]
    pub input_months: u32,

    /// Exclude ERA5 reanalysis features
    #[arg(long = "skip_era5")]
    pub skip_era5: bool,
}

impl TrainArgs {
    fn into_pipeline_args(self, model_overrides: BTreeMap<String, String>) -> PipelineArgs {
        PipelineArgs {
            model_name: self.model_name,
            train_datasets: self.train_datasets,
            eval_datasets: self.eval_datasets,
            region: self.region,
            bounds: BoundsOverride {
                min_lat: self.min_lat,
                max_lat: self.max_lat,
                min_lon: self.min_lon,
                max_lon: self.max_lon,
            },
            up_to_year: Some(self.up_to_year),
            start_month: Some(self.start_month),
            input_months: Some(self.input_months),
            skip_era5: self.skip_era5,
            model_overrides,
        }
    }
}

/// Add one `--<name>` flag per model-declared parameter to the `train`
/// subcommand, defaulting to the declared value. Names must already have
/// passed `check_extension`, otherwise clap rejects the duplicate.
pub fn register_model_args(command: clap::Command, params: &ModelParams) -> clap::Command {
    command.mut_subcommand(TRAIN_COMMAND, |train| {
        params.iter().fold(train, |train, (name, default)| train.arg(model_arg(name, default)))
    })
}

fn model_arg(name: &str, default: &ParamValue) -> Arg {
    let arg = Arg::new(name.to_string())
        .long(name.to_string())
        .value_name(default.type_name().to_uppercase())
        .help(format!("Model parameter ({})", default.type_name()))
        .help_heading(MODEL_HEADING)
        .default_value(default.to_string());

    match default {
        ParamValue::Bool(_) => arg.num_args(0..=1).default_missing_value("true"),
        _ => arg.allow_negative_numbers(true),
    }
}

/// Raw values of the model parameters given explicitly on the command line.
pub fn model_overrides(matches: &ArgMatches, params: &ModelParams) -> BTreeMap<String, String> {
    let Some(train) = matches.subcommand_matches(TRAIN_COMMAND) else {
        return BTreeMap::new();
    };
    params
        .names()
        .filter(|name| train.value_source(name) == Some(ValueSource::CommandLine))
        .filter_map(|name| train.get_one::<String>(name).map(|raw| (name.to_string(), raw.clone())))
        .collect()
}

pub fn execute(ctx: &CliContext, args: TrainArgs, model_overrides: BTreeMap<String, String>) -> Result<()> {
    let hparams = HyperparameterResolver::new(&ctx.catalog)
        .resolve(args.into_pipeline_args(model_overrides), ctx.component.as_ref())
        .context("Invalid training configuration")?;

    let bbox = hparams.effective_bbox(&ctx.catalog.regions)?;
    println!("{}", bbox.url());

    let outcome = TrainingOrchestrator::new(ctx.pipeline(), &TracingProgressSink)
        .train(&hparams)
        .with_context(|| format!("Training {} failed", hparams.model_name))?;

    println!("{}", serde_json::to_string_pretty(&outcome.metrics)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches, Parser};

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        command: TestCommand,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestCommand {
        Train(TrainArgs),
    }

    fn params() -> ModelParams {
        ModelParams::new()
            .with("learning_rate", ParamValue::Float(0.1))
            .with("max_epochs", ParamValue::Int(200))
            .with("balanced", ParamValue::Bool(false))
    }

    fn parse(argv: &[&str]) -> ArgMatches {
        register_model_args(TestCli::command(), &params()).try_get_matches_from(argv).unwrap()
    }

    #[test]
    fn test_only_explicit_model_values_are_overrides() {
        let matches = parse(&["cropmask", "train", "--learning_rate", "0.5", "--balanced"]);
        let overrides = model_overrides(&matches, &params());

        assert_eq!(overrides.get("learning_rate").map(String::as_str), Some("0.5"));
        assert_eq!(overrides.get("balanced").map(String::as_str), Some("true"));
        assert!(!overrides.contains_key("max_epochs"));
    }

    #[test]
    fn test_pipeline_flags_parse() {
        let matches = parse(&["cropmask", "train", "--model_name", "Kenya", "--min_lat", "-3.5", "--skip_era5"]);
        let TestCommand::Train(args) = TestCli::from_arg_matches(&matches).unwrap().command;
        let pipeline = args.into_pipeline_args(BTreeMap::new());

        assert_eq!(pipeline.model_name.as_deref(), Some("Kenya"));
        assert_eq!(pipeline.bounds.min_lat, Some(-3.5));
        assert!(pipeline.skip_era5);
        assert_eq!(pipeline.up_to_year, Some(2022));
        assert_eq!(pipeline.start_month.as_deref(), Some("February"));
        assert_eq!(pipeline.input_months, Some(12));
    }
}
