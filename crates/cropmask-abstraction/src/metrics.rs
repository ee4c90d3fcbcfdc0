//! Evaluation metrics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metric name to scalar value, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metrics(BTreeMap<String, f64>);

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy every metric of `other` in as `"{prefix}_{name}"`.
    pub fn merge_prefixed(&mut self, prefix: &str, other: &Metrics) {
        for (name, value) in other.iter() {
            self.0.insert(format!("{prefix}_{name}"), value);
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{name}': {value}")?;
        }
        f.write_str("}")
    }
}

/// Binary classification summary of `scores` against `labels`.
///
/// `num_records` is always present. `accuracy` needs at least one record,
/// `precision`/`recall`/`f1_score` need a non-zero denominator and `roc_auc`
/// needs both classes; undefined metrics are omitted rather than reported as 0.
#[must_use]
pub fn binary_classification_metrics(labels: &[bool], scores: &[f64], threshold: f64) -> Metrics {
    debug_assert_eq!(labels.len(), scores.len());

    let mut metrics = Metrics::new();
    let n = labels.len().min(scores.len());
    metrics.insert("num_records", n as f64);
    if n == 0 {
        return metrics;
    }

    let (mut tp, mut fp, mut tn, mut fn_) = (0usize, 0usize, 0usize, 0usize);
    for (&label, &score) in labels.iter().zip(scores) {
        match (label, score >= threshold) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (false, false) => tn += 1,
            (true, false) => fn_ += 1,
        }
    }

    metrics.insert("accuracy", (tp + tn) as f64 / n as f64);

    let precision = (tp + fp > 0).then(|| tp as f64 / (tp + fp) as f64);
    let recall = (tp + fn_ > 0).then(|| tp as f64 / (tp + fn_) as f64);
    if let Some(p) = precision {
        metrics.insert("precision", p);
    }
    if let Some(r) = recall {
        metrics.insert("recall", r);
    }
    if let (Some(p), Some(r)) = (precision, recall) {
        if p + r > 0.0 {
            metrics.insert("f1_score", 2.0 * p * r / (p + r));
        }
    }

    if let Some(auc) = roc_auc(&labels[..n], &scores[..n]) {
        metrics.insert("roc_auc", auc);
    }

    metrics
}

/// Mann-Whitney estimate of ROC AUC with average ranks for tied scores.
fn roc_auc(labels: &[bool], scores: &[f64]) -> Option<f64> {
    let positives = labels.iter().filter(|l| **l).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut positive_rank_sum = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]].total_cmp(&scores[order[i]]).is_eq() {
            j += 1;
        }
        // ranks are 1-based; tied block [i, j] shares the mean rank
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            if labels[idx] {
                positive_rank_sum += rank;
            }
        }
        i = j + 1;
    }

    let p = positives as f64;
    let q = negatives as f64;
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * q))
}
