//! Model-declared hyperparameters.

use crate::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single hyperparameter value. The variant of a declared default fixes the
/// type that overrides are parsed into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
        }
    }

    /// Parse `raw` into the same variant as `self`.
    pub fn parse_like(&self, name: &str, raw: &str) -> ModelResult<Self> {
        let raw = raw.trim();
        let invalid = |reason: String| ModelError::InvalidParam { name: name.to_string(), reason };

        match self {
            Self::Bool(_) => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(Self::Bool(true)),
                "false" | "0" | "no" => Ok(Self::Bool(false)),
                _ => Err(invalid(format!("expected a boolean, got '{raw}'"))),
            },
            Self::Int(_) => raw
                .parse::<i64>()
                .map(Self::Int)
                .map_err(|e| invalid(format!("expected an integer, got '{raw}': {e}"))),
            Self::Float(_) => {
                let value = raw
                    .parse::<f64>()
                    .map_err(|e| invalid(format!("expected a number, got '{raw}': {e}")))?;
                if !value.is_finite() {
                    return Err(invalid(format!("expected a finite number, got '{raw}'")));
                }
                Ok(Self::Float(value))
            }
            Self::Text(_) => Ok(Self::Text(raw.to_string())),
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => v.fmt(f),
            Self::Int(v) => v.fmt(f),
            Self::Float(v) => v.fmt(f),
            Self::Text(v) => v.fmt(f),
        }
    }
}

/// Name-to-value mapping of model hyperparameters, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelParams(BTreeMap<String, ParamValue>);

impl ModelParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) -> Option<ParamValue> {
        self.0.insert(name.into(), value)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Required numeric parameter (ints are widened).
    pub fn float(&self, name: &str) -> ModelResult<f64> {
        self.require(name)?.as_f64().ok_or_else(|| ModelError::InvalidParam {
            name: name.to_string(),
            reason: "expected a number".to_string(),
        })
    }

    /// Required integer parameter.
    pub fn int(&self, name: &str) -> ModelResult<i64> {
        self.require(name)?.as_i64().ok_or_else(|| ModelError::InvalidParam {
            name: name.to_string(),
            reason: "expected an integer".to_string(),
        })
    }

    fn require(&self, name: &str) -> ModelResult<&ParamValue> {
        self.get(name).ok_or_else(|| ModelError::InvalidParam {
            name: name.to_string(),
            reason: "missing".to_string(),
        })
    }
}

impl FromIterator<(String, ParamValue)> for ModelParams {
    fn from_iter<T: IntoIterator<Item = (String, ParamValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_like_keeps_declared_type() {
        let default = ParamValue::Float(0.1);
        assert_eq!(default.parse_like("lr", "0.25").unwrap(), ParamValue::Float(0.25));
        assert_eq!(ParamValue::Int(3).parse_like("epochs", " 7 ").unwrap(), ParamValue::Int(7));
        assert_eq!(ParamValue::Bool(false).parse_like("flag", "TRUE").unwrap(), ParamValue::Bool(true));
        assert_eq!(
            ParamValue::Text("a".to_string()).parse_like("name", "b").unwrap(),
            ParamValue::Text("b".to_string())
        );
    }

    #[test]
    fn test_parse_like_rejects_wrong_type() {
        let err = ParamValue::Int(3).parse_like("epochs", "three").unwrap_err();
        assert!(matches!(err, ModelError::InvalidParam { ref name, .. } if name == "epochs"));
        assert!(ParamValue::Float(1.0).parse_like("lr", "NaN").is_err());
    }

    #[test]
    fn test_typed_getters() {
        let params = ModelParams::new()
            .with("learning_rate", ParamValue::Float(0.5))
            .with("max_epochs", ParamValue::Int(10));

        assert_eq!(params.float("learning_rate").unwrap(), 0.5);
        assert_eq!(params.float("max_epochs").unwrap(), 10.0);
        assert_eq!(params.int("max_epochs").unwrap(), 10);
        assert!(params.int("learning_rate").is_err());
        assert!(params.float("missing").is_err());
    }

    #[test]
    fn test_untagged_serde_preserves_variants() {
        let params = ModelParams::new()
            .with("a", ParamValue::Float(1.0))
            .with("b", ParamValue::Int(1))
            .with("c", ParamValue::Bool(true));
        let json = serde_json::to_string(&params).unwrap();
        let back: ModelParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
