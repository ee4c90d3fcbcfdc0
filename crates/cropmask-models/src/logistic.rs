use cropmask_abstraction::{
    Classifier, Corpus, LabeledRecord, ModelComponent, ModelError, ModelParams, ModelResult, ParamValue,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const LOGISTIC_MODEL_TYPE: &str = "logistic";

const DEFAULT_LEARNING_RATE: f64 = 0.1;
const DEFAULT_MAX_EPOCHS: i64 = 200;
const DEFAULT_L2: f64 = 0.0;
const DEFAULT_THRESHOLD: f64 = 0.5;

/// Logistic regression over the concatenated feature vectors of a corpus,
/// fitted with full-batch gradient descent. Deterministic: the same corpus and
/// parameters always produce the same weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogisticCropModel;

impl LogisticCropModel {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Clone, Copy)]
struct FitConfig {
    learning_rate: f64,
    max_epochs: usize,
    l2: f64,
    threshold: f64,
}

impl FitConfig {
    fn from_params(params: &ModelParams) -> ModelResult<Self> {
        let learning_rate = params.float("learning_rate")?;
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(invalid("learning_rate", "must be a positive number"));
        }
        let max_epochs = usize::try_from(params.int("max_epochs")?)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| invalid("max_epochs", "must be at least 1"))?;
        let l2 = params.float("l2")?;
        if !(l2.is_finite() && l2 >= 0.0) {
            return Err(invalid("l2", "must be zero or positive"));
        }
        let threshold = params.float("probability_threshold")?;
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(invalid("probability_threshold", "must lie strictly between 0 and 1"));
        }
        Ok(Self { learning_rate, max_epochs, l2, threshold })
    }
}

fn invalid(name: &str, reason: &str) -> ModelError {
    ModelError::InvalidParam { name: name.to_string(), reason: reason.to_string() }
}

/// One feature source and how many columns it occupies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FeatureSlot {
    source: String,
    width: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticClassifier {
    layout: Vec<FeatureSlot>,
    mean: Vec<f64>,
    scale: Vec<f64>,
    weights: Vec<f64>,
    bias: f64,
    threshold: f64,
}

impl LogisticClassifier {
    fn width(&self) -> usize {
        self.layout.iter().map(|s| s.width).sum()
    }

    fn validate(&self) -> ModelResult<()> {
        let width = self.width();
        if self.mean.len() != width || self.scale.len() != width || self.weights.len() != width {
            return Err(ModelError::InvalidState(format!(
                "feature width {width} does not match stored vectors ({}, {}, {})",
                self.mean.len(),
                self.scale.len(),
                self.weights.len()
            )));
        }
        let finite = self.mean.iter().chain(&self.scale).chain(&self.weights).all(|v| v.is_finite());
        if !finite || !self.bias.is_finite() || self.scale.iter().any(|s| *s <= 0.0) {
            return Err(ModelError::InvalidState("non-finite or non-positive coefficients".to_string()));
        }
        Ok(())
    }

    fn normalized(&self, record: &LabeledRecord) -> Vec<f64> {
        vectorize(&self.layout, record)
            .into_iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect()
    }
}

impl Classifier for LogisticClassifier {
    fn model_type(&self) -> &'static str {
        LOGISTIC_MODEL_TYPE
    }

    fn predict(&self, record: &LabeledRecord) -> ModelResult<f64> {
        let x = self.normalized(record);
        Ok(sigmoid(dot(&self.weights, &x) + self.bias))
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn save_state(&self) -> ModelResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ModelError::Other(e.to_string()))
    }
}

impl ModelComponent for LogisticCropModel {
    fn model_type(&self) -> &'static str {
        LOGISTIC_MODEL_TYPE
    }

    fn declare_params(&self) -> ModelParams {
        ModelParams::new()
            .with("learning_rate", ParamValue::Float(DEFAULT_LEARNING_RATE))
            .with("max_epochs", ParamValue::Int(DEFAULT_MAX_EPOCHS))
            .with("l2", ParamValue::Float(DEFAULT_L2))
            .with("probability_threshold", ParamValue::Float(DEFAULT_THRESHOLD))
    }

    fn fit(&self, corpus: &Corpus, params: &ModelParams) -> ModelResult<Box<dyn Classifier>> {
        let config = FitConfig::from_params(params)?;
        if corpus.is_empty() {
            return Err(ModelError::EmptyCorpus);
        }

        let layout = feature_layout(corpus);
        let rows: Vec<Vec<f64>> = corpus.records().iter().map(|r| vectorize(&layout, r)).collect();
        let labels: Vec<f64> = corpus.records().iter().map(|r| if r.is_crop { 1.0 } else { 0.0 }).collect();
        let (mean, scale) = column_stats(&rows, layout.iter().map(|s| s.width).sum());
        let rows: Vec<Vec<f64>> = rows
            .into_iter()
            .map(|row| row.iter().zip(mean.iter().zip(&scale)).map(|(x, (m, s))| (x - m) / s).collect())
            .collect();

        let (weights, bias) = gradient_descent(&rows, &labels, &config)?;
        debug!(records = rows.len(), columns = weights.len(), epochs = config.max_epochs, "Fitted logistic model");

        Ok(Box::new(LogisticClassifier { layout, mean, scale, weights, bias, threshold: config.threshold }))
    }

    fn load_state(&self, bytes: &[u8]) -> ModelResult<Box<dyn Classifier>> {
        let classifier: LogisticClassifier =
            serde_json::from_slice(bytes).map_err(|e| ModelError::InvalidState(e.to_string()))?;
        classifier.validate()?;
        Ok(Box::new(classifier))
    }
}

/// Sources in sorted order, each as wide as its longest vector in the corpus.
fn feature_layout(corpus: &Corpus) -> Vec<FeatureSlot> {
    corpus
        .feature_sources()
        .iter()
        .map(|source| {
            let width = corpus
                .records()
                .iter()
                .filter_map(|r| r.features.get(source).map(Vec::len))
                .max()
                .unwrap_or(0);
            FeatureSlot { source: source.clone(), width }
        })
        .filter(|slot| slot.width > 0)
        .collect()
}

/// Missing sources and short vectors are zero-filled; sources outside the
/// layout are ignored.
fn vectorize(layout: &[FeatureSlot], record: &LabeledRecord) -> Vec<f64> {
    let mut out = Vec::with_capacity(layout.iter().map(|s| s.width).sum());
    for slot in layout {
        let values = record.features.get(&slot.source).map_or(&[][..], Vec::as_slice);
        out.extend((0..slot.width).map(|i| values.get(i).copied().unwrap_or(0.0)));
    }
    out
}

fn column_stats(rows: &[Vec<f64>], width: usize) -> (Vec<f64>, Vec<f64>) {
    let n = rows.len() as f64;
    let mut mean = vec![0.0; width];
    for row in rows {
        for (m, x) in mean.iter_mut().zip(row) {
            *m += x / n;
        }
    }
    let mut var = vec![0.0; width];
    for row in rows {
        for ((v, x), m) in var.iter_mut().zip(row).zip(&mean) {
            *v += (x - m).powi(2) / n;
        }
    }
    // constant columns keep unit scale
    let scale = var.into_iter().map(|v| if v > f64::EPSILON { v.sqrt() } else { 1.0 }).collect();
    (mean, scale)
}

fn gradient_descent(rows: &[Vec<f64>], labels: &[f64], config: &FitConfig) -> ModelResult<(Vec<f64>, f64)> {
    let width = rows.first().map_or(0, Vec::len);
    let n = rows.len() as f64;
    let mut weights = vec![0.0; width];
    let mut bias = 0.0;

    for epoch in 0..config.max_epochs {
        let mut grad_w = vec![0.0; width];
        let mut grad_b = 0.0;
        for (row, y) in rows.iter().zip(labels) {
            let err = sigmoid(dot(&weights, row) + bias) - y;
            for (g, x) in grad_w.iter_mut().zip(row) {
                *g += err * x / n;
            }
            grad_b += err / n;
        }
        for (w, g) in weights.iter_mut().zip(&grad_w) {
            *w -= config.learning_rate * (g + config.l2 * *w);
        }
        bias -= config.learning_rate * grad_b;

        if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(ModelError::Fit(format!("weights diverged at epoch {}", epoch + 1)));
        }
    }

    Ok((weights, bias))
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
