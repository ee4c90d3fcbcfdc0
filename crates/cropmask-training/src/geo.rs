//! Rectangular geographic extents.

use crate::error::{TrainingError, TrainingResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated latitude/longitude box in degrees.
///
/// Invariants: all bounds finite, `min_lat <= max_lat`, `min_lon <= max_lon`,
/// latitudes within [-90, 90] and longitudes within [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBoundingBox")]
pub struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

#[derive(Deserialize)]
struct RawBoundingBox {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl TryFrom<RawBoundingBox> for BoundingBox {
    type Error = TrainingError;

    fn try_from(raw: RawBoundingBox) -> TrainingResult<Self> {
        Self::new(raw.min_lat, raw.max_lat, raw.min_lon, raw.max_lon)
    }
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> TrainingResult<Self> {
        for (name, value) in [("min_lat", min_lat), ("max_lat", max_lat), ("min_lon", min_lon), ("max_lon", max_lon)] {
            if !value.is_finite() {
                return Err(TrainingError::config(format!("{name} must be finite, got {value}")));
            }
        }
        if !(-90.0..=90.0).contains(&min_lat) || !(-90.0..=90.0).contains(&max_lat) {
            return Err(TrainingError::config(format!(
                "latitudes must be within [-90, 90], got [{min_lat}, {max_lat}]"
            )));
        }
        if !(-180.0..=180.0).contains(&min_lon) || !(-180.0..=180.0).contains(&max_lon) {
            return Err(TrainingError::config(format!(
                "longitudes must be within [-180, 180], got [{min_lon}, {max_lon}]"
            )));
        }
        if min_lat > max_lat {
            return Err(TrainingError::config(format!("min_lat ({min_lat}) exceeds max_lat ({max_lat})")));
        }
        if min_lon > max_lon {
            return Err(TrainingError::config(format!("min_lon ({min_lon}) exceeds max_lon ({max_lon})")));
        }
        Ok(Self { min_lat, max_lat, min_lon, max_lon })
    }

    #[must_use]
    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    #[must_use]
    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }

    #[must_use]
    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }

    #[must_use]
    pub fn max_lon(&self) -> f64 {
        self.max_lon
    }

    /// bboxfinder.com link for eyeballing the box.
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "http://bboxfinder.com/#{},{},{},{}",
            self.min_lat, self.min_lon, self.max_lat, self.max_lon
        )
    }

    /// Point containment, edges inclusive.
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }

    /// Whether the two boxes share at least one point (touching edges count).
    #[must_use]
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
            && self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// Explicit per-field bounds that replace a region's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundsOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lon: Option<f64>,
}

impl BoundsOverride {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min_lat.is_none() && self.max_lat.is_none() && self.min_lon.is_none() && self.max_lon.is_none()
    }

    /// Checks that need no region lookup: every explicit value is finite and,
    /// where both ends of an axis are explicit, they are ordered.
    pub fn validate_explicit(&self) -> TrainingResult<()> {
        for (name, value) in self.fields() {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(TrainingError::config(format!("{name} must be finite, got {v}")));
                }
            }
        }
        if let (Some(lo), Some(hi)) = (self.min_lat, self.max_lat) {
            if lo > hi {
                return Err(TrainingError::config(format!("min_lat ({lo}) exceeds max_lat ({hi})")));
            }
        }
        if let (Some(lo), Some(hi)) = (self.min_lon, self.max_lon) {
            if lo > hi {
                return Err(TrainingError::config(format!("min_lon ({lo}) exceeds max_lon ({hi})")));
            }
        }
        Ok(())
    }

    /// Replace the fields of `base` that are set here, then re-validate.
    pub fn apply(&self, base: &BoundingBox) -> TrainingResult<BoundingBox> {
        BoundingBox::new(
            self.min_lat.unwrap_or(base.min_lat),
            self.max_lat.unwrap_or(base.max_lat),
            self.min_lon.unwrap_or(base.min_lon),
            self.max_lon.unwrap_or(base.max_lon),
        )
    }

    fn fields(&self) -> [(&'static str, Option<f64>); 4] {
        [
            ("min_lat", self.min_lat),
            ("max_lat", self.max_lat),
            ("min_lon", self.min_lon),
            ("max_lon", self.max_lon),
        ]
    }
}
