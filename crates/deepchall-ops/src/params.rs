//! Run parameters.
//!
//! Parameters travel as JSON values keyed by name. Each layer of a run
//! (global defaults, preset defaults, user overrides) is a [`RunParams`] and
//! later layers win when merged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OpsError, OpsResult};

/// Cap on training samples drawn from a language.
pub const MAX_SAMPLES: &str = "max_samples";
/// Longest sample admitted for training; `null` means unbounded.
pub const MAX_LENGTH: &str = "max_length";
/// Passes over the training data.
pub const EPOCHS: &str = "epochs";
/// Candidates drawn from the trained model.
pub const TEST_SAMPLES: &str = "test_samples";
/// Alphabet size handed to models.
pub const ALPHABET_SIZE: &str = "alphabet_size";
/// Language shape handed to models.
pub const SHAPE: &str = "shape";

/// Declaration of a tunable parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub default: Value,
}

impl ParamSpec {
    pub fn new(name: &'static str, description: &'static str, default: impl Into<Value>) -> Self {
        Self {
            name,
            description,
            default: default.into(),
        }
    }
}

/// Parameter map with typed accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunParams(BTreeMap<String, Value>);

impl RunParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults shared by every language instance.
    pub fn global_defaults() -> Self {
        Self::new()
            .with(MAX_SAMPLES, 100)
            .with(MAX_LENGTH, Value::Null)
            .with(EPOCHS, 10)
            .with(TEST_SAMPLES, 100)
    }

    /// Defaults declared by a preset.
    pub fn from_specs(specs: &[ParamSpec]) -> Self {
        specs.iter().fold(Self::new(), |params, spec| {
            params.with(spec.name, spec.default.clone())
        })
    }

    /// Merge layers in order of increasing precedence.
    pub fn layered<'a>(layers: impl IntoIterator<Item = &'a RunParams>) -> Self {
        let mut merged = Self::new();
        for layer in layers {
            merged.extend(layer);
        }
        merged
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Overwrite with every entry of `other`.
    pub fn extend(&mut self, other: &RunParams) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), value.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Required non-negative integer.
    pub fn usize(&self, name: &str) -> OpsResult<usize> {
        self.optional_usize(name)?
            .ok_or_else(|| OpsError::invalid_param(name, "missing value"))
    }

    /// Non-negative integer where absence and `null` both mean `None`.
    pub fn optional_usize(&self, name: &str) -> OpsResult<Option<usize>> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| {
                    OpsError::invalid_param(
                        name,
                        format!("expected a non-negative integer, found {value}"),
                    )
                }),
        }
    }

    /// Required unsigned 64-bit integer, used for seeds.
    pub fn u64(&self, name: &str) -> OpsResult<u64> {
        match self.0.get(name) {
            Some(value) => value.as_u64().ok_or_else(|| {
                OpsError::invalid_param(
                    name,
                    format!("expected a non-negative integer, found {value}"),
                )
            }),
            None => Err(OpsError::invalid_param(name, "missing value")),
        }
    }

    /// Parse `key=value` where the value is read as JSON, falling back to a
    /// plain string.
    pub fn parse_assignment(assignment: &str) -> OpsResult<(String, Value)> {
        let (name, raw) = assignment.split_once('=').ok_or_else(|| {
            OpsError::invalid_param(assignment, "expected an assignment of the form key=value")
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(OpsError::invalid_param(assignment, "empty parameter name"));
        }
        let raw = raw.trim();
        let value =
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        Ok((name.to_string(), value))
    }
}

impl FromIterator<(String, Value)> for RunParams {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
