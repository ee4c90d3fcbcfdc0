//! Region and dataset catalog loaded from TOML.
//!
//! ```toml
//! [defaults]
//! region = "East_Africa"
//! model_name = "East_Africa"
//! train_datasets = ["Kenya", "Uganda"]
//! eval_datasets = ["Kenya"]
//!
//! [regions.East_Africa]
//! min_lat = -12.0
//! max_lat = 15.0
//! min_lon = 28.0
//! max_lon = 48.0
//!
//! [datasets.Kenya]
//! start_date = "2019-01-01"
//! end_date = "2020-12-31"
//! footprint = { min_lat = -4.7, max_lat = 4.62, min_lon = 33.9, max_lon = 41.89 }
//! path = "Kenya.jsonl"   # optional
//! ```

use crate::dataset::{DatasetHandle, DatasetRegistry, DatasetSelection};
use crate::error::{TrainingError, TrainingResult};
use crate::geo::BoundingBox;
use crate::region::RegionRegistry;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Fallbacks for pipeline fields the caller leaves unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDefaults {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub train_datasets: DatasetSelection,
    #[serde(default)]
    pub eval_datasets: DatasetSelection,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    defaults: CatalogDefaults,
    #[serde(default)]
    regions: BTreeMap<String, BoundingBox>,
    #[serde(default)]
    datasets: BTreeMap<String, DatasetEntry>,
}

#[derive(Debug, Deserialize)]
struct DatasetEntry {
    start_date: NaiveDate,
    end_date: NaiveDate,
    footprint: BoundingBox,
    #[serde(default)]
    path: Option<PathBuf>,
}

/// Registries and defaults, populated once at startup and read-only after.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub regions: RegionRegistry,
    pub datasets: DatasetRegistry,
    pub defaults: CatalogDefaults,
}

impl Catalog {
    pub fn load(path: &Path) -> TrainingResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TrainingError::Catalog(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
            .map_err(|e| TrainingError::Catalog(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> TrainingResult<Self> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|e| TrainingError::Catalog(e.to_string()))?;

        let regions: RegionRegistry = file.regions.into_iter().collect();

        let mut datasets = DatasetRegistry::new();
        for (name, entry) in file.datasets {
            let mut handle = DatasetHandle::new(name, entry.start_date, entry.end_date, entry.footprint)?;
            handle.path = entry.path;
            datasets = datasets.with_dataset(handle);
        }

        let catalog = Self { regions, datasets, defaults: file.defaults };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Defaults must refer to entries that exist.
    fn validate(&self) -> TrainingResult<()> {
        if let Some(region) = &self.defaults.region {
            if !self.regions.contains(region) {
                return Err(TrainingError::Catalog(format!("default region '{region}' is not defined")));
            }
        }
        for name in self.defaults.train_datasets.iter().chain(self.defaults.eval_datasets.iter()) {
            if !self.datasets.contains(name) {
                return Err(TrainingError::Catalog(format!("default dataset '{name}' is not defined")));
            }
        }
        Ok(())
    }
}
