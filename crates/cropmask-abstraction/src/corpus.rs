//! Ground-truth records and the corpus assembled from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One geo-tagged crop/non-crop label with its features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRecord {
    /// Dataset the record was loaded from. Filled in by the label store.
    #[serde(default)]
    pub dataset: String,
    pub lat: f64,
    pub lon: f64,
    /// Observation date of the label.
    pub date: NaiveDate,
    pub is_crop: bool,
    /// Feature vectors keyed by feature source (e.g. "s2", "era5").
    #[serde(default)]
    pub features: BTreeMap<String, Vec<f64>>,
}

/// The filtered records handed to a model for one fit or evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    records: Vec<LabeledRecord>,
    feature_sources: BTreeSet<String>,
    contributions: Vec<(String, usize)>,
}

impl Corpus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the records contributed by `dataset`. An empty contribution is
    /// still recorded so the corpus reports every selected dataset.
    pub fn extend_from(&mut self, dataset: &str, records: Vec<LabeledRecord>) {
        for record in &records {
            self.feature_sources.extend(record.features.keys().cloned());
        }
        self.contributions.push((dataset.to_string(), records.len()));
        self.records.extend(records);
    }

    /// Drop a feature source from the feature set and from every record.
    /// Returns whether the source was present.
    pub fn exclude_feature_source(&mut self, source: &str) -> bool {
        let present = self.feature_sources.remove(source);
        for record in &mut self.records {
            record.features.remove(source);
        }
        present
    }

    /// Records contributed by a single dataset, sharing this corpus' feature set.
    #[must_use]
    pub fn dataset_subset(&self, dataset: &str) -> Self {
        let records: Vec<_> = self.records.iter().filter(|r| r.dataset == dataset).cloned().collect();
        Self {
            contributions: vec![(dataset.to_string(), records.len())],
            feature_sources: self.feature_sources.clone(),
            records,
        }
    }

    #[must_use]
    pub fn records(&self) -> &[LabeledRecord] {
        &self.records
    }

    #[must_use]
    pub fn feature_sources(&self) -> &BTreeSet<String> {
        &self.feature_sources
    }

    /// `(dataset, record count)` in the order datasets were added.
    #[must_use]
    pub fn contributions(&self) -> &[(String, usize)] {
        &self.contributions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(dataset: &str, sources: &[&str]) -> LabeledRecord {
        LabeledRecord {
            dataset: dataset.to_string(),
            lat: 0.0,
            lon: 30.0,
            date: NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
            is_crop: true,
            features: sources.iter().map(|s| ((*s).to_string(), vec![1.0, 2.0])).collect(),
        }
    }

    #[test]
    fn test_extend_tracks_contributions_and_sources() {
        let mut corpus = Corpus::new();
        corpus.extend_from("Kenya", vec![record("Kenya", &["s2", "era5"])]);
        corpus.extend_from("Rwanda", vec![]);

        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.contributions(), &[("Kenya".to_string(), 1), ("Rwanda".to_string(), 0)]);
        assert!(corpus.feature_sources().contains("era5"));
    }

    #[test]
    fn test_exclude_feature_source_keeps_records() {
        let mut corpus = Corpus::new();
        corpus.extend_from("Kenya", vec![record("Kenya", &["s2", "era5"]), record("Kenya", &["s2", "era5"])]);

        assert!(corpus.exclude_feature_source("era5"));
        assert_eq!(corpus.len(), 2);
        assert!(!corpus.feature_sources().contains("era5"));
        assert!(corpus.records().iter().all(|r| !r.features.contains_key("era5")));
        assert!(!corpus.exclude_feature_source("era5"));
    }

    #[test]
    fn test_dataset_subset() {
        let mut corpus = Corpus::new();
        corpus.extend_from("Kenya", vec![record("Kenya", &["s2"])]);
        corpus.extend_from("Uganda", vec![record("Uganda", &["s2"]), record("Uganda", &["s2"])]);

        let subset = corpus.dataset_subset("Uganda");
        assert_eq!(subset.len(), 2);
        assert_eq!(subset.feature_sources(), corpus.feature_sources());
    }
}
