use crate::error::{TrainingError, TrainingResult};
use crate::geo::BoundingBox;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

/// A named ground-truth dataset: its time range, spatial footprint and where
/// the label store finds its records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetHandle {
    pub name: String,
    /// First label date, inclusive.
    pub start_date: NaiveDate,
    /// Last label date, inclusive.
    pub end_date: NaiveDate,
    pub footprint: BoundingBox,
    /// Store-relative location of the records; stores pick a default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl DatasetHandle {
    pub fn new(
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        footprint: BoundingBox,
    ) -> TrainingResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TrainingError::Catalog("dataset name must not be empty".to_string()));
        }
        if start_date > end_date {
            return Err(TrainingError::Catalog(format!(
                "dataset {name}: start_date {start_date} is after end_date {end_date}"
            )));
        }
        Ok(Self { name, start_date, end_date, footprint, path: None })
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Read-only mapping of dataset name to handle.
#[derive(Debug, Clone, Default)]
pub struct DatasetRegistry {
    datasets: BTreeMap<String, DatasetHandle>,
}

impl DatasetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_dataset(mut self, handle: DatasetHandle) -> Self {
        self.datasets.insert(handle.name.clone(), handle);
        self
    }

    pub fn resolve(&self, name: &str) -> TrainingResult<&DatasetHandle> {
        self.datasets.get(name).ok_or_else(|| TrainingError::UnknownDataset(name.to_string()))
    }

    /// Resolve names in order. Fails on the first unknown entry. Duplicates in
    /// the input yield duplicate handles; deduplication belongs to
    /// `DatasetSelection`.
    pub fn resolve_many<S: AsRef<str>>(&self, names: &[S]) -> TrainingResult<Vec<&DatasetHandle>> {
        names.iter().map(|name| self.resolve(name.as_ref())).collect()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.datasets.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// Ordered, duplicate-free list of dataset names.
///
/// Parsing keeps the first occurrence of a repeated name and logs the rest;
/// training consumes the union, so repeats would only double-count records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct DatasetSelection(Vec<String>);

impl DatasetSelection {
    pub const SEPARATOR: char = ',';

    /// Split on `,`, trim whitespace, drop empty entries, dedupe.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        Self::from_names(input.split(Self::SEPARATOR))
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if seen.insert(name.to_string()) {
                out.push(name.to_string());
            } else {
                warn!(dataset = %name, "Ignoring repeated dataset in selection");
            }
        }
        Self(out)
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for DatasetSelection {
    fn from(names: Vec<String>) -> Self {
        Self::from_names(names)
    }
}

impl From<DatasetSelection> for Vec<String> {
    fn from(selection: DatasetSelection) -> Self {
        selection.0
    }
}

impl fmt::Display for DatasetSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}
