//! Named regions supplying default bounding boxes.

use crate::error::{TrainingError, TrainingResult};
use crate::geo::BoundingBox;
use std::collections::BTreeMap;

/// Read-only mapping of region name to bounding box.
#[derive(Debug, Clone, Default)]
pub struct RegionRegistry {
    regions: BTreeMap<String, BoundingBox>,
}

impl RegionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration, used while loading the catalog.
    #[must_use]
    pub fn with_region(mut self, name: impl Into<String>, bbox: BoundingBox) -> Self {
        self.regions.insert(name.into(), bbox);
        self
    }

    pub fn resolve(&self, name: &str) -> TrainingResult<BoundingBox> {
        self.regions.get(name).copied().ok_or_else(|| TrainingError::UnknownRegion(name.to_string()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.regions.contains_key(name)
    }

    /// Region names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoundingBox)> {
        self.regions.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl FromIterator<(String, BoundingBox)> for RegionRegistry {
    fn from_iter<T: IntoIterator<Item = (String, BoundingBox)>>(iter: T) -> Self {
        Self { regions: iter.into_iter().collect() }
    }
}
