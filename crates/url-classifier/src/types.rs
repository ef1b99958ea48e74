// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Type-safe domain models for URL classification
//!
//! This module provides strongly-typed wrappers that encode business invariants
//! in the type system, making invalid states irrepresentable.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::ScanStatus;

use crate::error::{ClassifyError, ClassifyResult, ModelLoadError, ModelLoadResult};

// Model version pattern, compiled on first use
static VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?\d+(\.\d+)*$").expect("version regex is valid"));

/// Classification label produced by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// URL is safe
    Good,
    /// URL is malicious or suspicious
    Bad,
}

impl Label {
    /// Wire name of the label, matching the class names in classifier artifacts
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Good => "good",
            Label::Bad => "bad",
        }
    }

    /// Scan status reported for this label
    pub fn status(&self) -> ScanStatus {
        match self {
            Label::Good => ScanStatus::Good,
            Label::Bad => ScanStatus::Bad,
        }
    }
}

impl FromStr for Label {
    type Err = ClassifyError;

    /// Parse a class name; anything other than `good`/`bad` has no usable label
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(Label::Good),
            "bad" => Ok(Label::Bad),
            other => Err(ClassifyError::classification(format!(
                "classifier produced unknown label '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model version with format validation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelVersion(String);

impl ModelVersion {
    /// Constant for latest version
    pub const LATEST: &'static str = "latest";

    /// Create a new model version with validation
    ///
    /// # Errors
    ///
    /// Returns an error if the version format is invalid
    pub fn new(value: impl Into<String>) -> ModelLoadResult<Self> {
        let s = value.into();
        if s.is_empty() {
            return Err(ModelLoadError::config("Model version cannot be empty"));
        }

        if s == Self::LATEST {
            return Ok(Self(s));
        }

        // v0, v1.0, v1.2.3, ...
        if !VERSION_REGEX.is_match(&s) {
            return Err(ModelLoadError::config(
                "Model version must be 'latest' or a version number (e.g., 'v1', 'v1.0', '1.2.3')",
            ));
        }

        Ok(Self(s))
    }

    /// Create latest version (infallible)
    pub fn latest() -> Self {
        Self(Self::LATEST.to_string())
    }

    /// Get the string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ModelVersion {
    fn default() -> Self {
        Self::latest()
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A URL as received from a caller, before normalization
///
/// Callers may send anything in the `url` slot. Strings are used as-is;
/// numbers, booleans and structured JSON are coerced to their canonical
/// string form, which the pipeline reports as an anomaly.
#[derive(Debug, Clone, PartialEq)]
pub enum UrlInput {
    /// A string value
    Text(String),
    /// A JSON number
    Number(serde_json::Number),
    /// A boolean
    Bool(bool),
    /// An array or object
    Structured(Value),
    /// No value (absent field or JSON `null`)
    Missing,
}

/// Canonical string form of a [`UrlInput`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl {
    value: String,
    coerced_from: Option<&'static str>,
}

impl NormalizedUrl {
    /// The canonical string
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Source type name when the input was not a string
    pub fn coerced_from(&self) -> Option<&'static str> {
        self.coerced_from
    }

    /// Whether the input had to be coerced to a string
    pub fn was_coerced(&self) -> bool {
        self.coerced_from.is_some()
    }
}

impl UrlInput {
    /// Build an input from an optional JSON value (absent field becomes [`UrlInput::Missing`])
    pub fn from_json(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => UrlInput::Missing,
            Some(Value::String(s)) => UrlInput::Text(s),
            Some(Value::Number(n)) => UrlInput::Number(n),
            Some(Value::Bool(b)) => UrlInput::Bool(b),
            Some(other) => UrlInput::Structured(other),
        }
    }

    /// Name of the input's type, used when logging coercions
    pub fn type_name(&self) -> &'static str {
        match self {
            UrlInput::Text(_) => "string",
            UrlInput::Number(_) => "number",
            UrlInput::Bool(_) => "boolean",
            UrlInput::Structured(Value::Array(_)) => "array",
            UrlInput::Structured(_) => "object",
            UrlInput::Missing => "null",
        }
    }

    /// Whether the input is missing or empty and must be rejected before classification
    ///
    /// Zero, `false` and empty strings or collections all count as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            UrlInput::Missing | UrlInput::Bool(false) => true,
            UrlInput::Text(s) => s.is_empty(),
            UrlInput::Number(n) => n.as_f64() == Some(0.0),
            UrlInput::Structured(Value::Array(items)) => items.is_empty(),
            UrlInput::Structured(Value::Object(fields)) => fields.is_empty(),
            UrlInput::Bool(true) | UrlInput::Structured(_) => false,
        }
    }

    /// The input as JSON, for echoing back to the caller
    pub fn to_json(&self) -> Value {
        match self {
            UrlInput::Text(s) => Value::String(s.clone()),
            UrlInput::Number(n) => Value::Number(n.clone()),
            UrlInput::Bool(b) => Value::Bool(*b),
            UrlInput::Structured(v) => v.clone(),
            UrlInput::Missing => Value::Null,
        }
    }

    /// Convert to the canonical string form
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::InvalidInput`] if the input is missing or empty
    pub fn normalize(&self) -> ClassifyResult<NormalizedUrl> {
        let (value, coerced_from) = match self {
            _ if self.is_empty() => {
                return Err(ClassifyError::invalid_input("no URL was provided"));
            }
            UrlInput::Text(s) => (s.clone(), None),
            UrlInput::Number(n) => (n.to_string(), Some(self.type_name())),
            UrlInput::Bool(b) => (b.to_string(), Some(self.type_name())),
            UrlInput::Structured(v) => (v.to_string(), Some(self.type_name())),
            UrlInput::Missing => {
                return Err(ClassifyError::invalid_input("no URL was provided"));
            }
        };

        Ok(NormalizedUrl {
            value,
            coerced_from,
        })
    }
}

impl From<&str> for UrlInput {
    fn from(value: &str) -> Self {
        UrlInput::Text(value.to_string())
    }
}

impl From<String> for UrlInput {
    fn from(value: String) -> Self {
        UrlInput::Text(value)
    }
}

impl From<Value> for UrlInput {
    fn from(value: Value) -> Self {
        UrlInput::from_json(Some(value))
    }
}

impl From<bool> for UrlInput {
    fn from(value: bool) -> Self {
        UrlInput::Bool(value)
    }
}

macro_rules! url_input_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for UrlInput {
                fn from(value: $ty) -> Self {
                    UrlInput::Number(serde_json::Number::from(value))
                }
            }
        )*
    };
}

url_input_from_integer!(i32, i64, u32, u64, usize);

impl From<f64> for UrlInput {
    /// NaN and infinities have no JSON number form and are kept as their text
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map_or_else(|| UrlInput::Text(value.to_string()), UrlInput::Number)
    }
}

impl From<f32> for UrlInput {
    fn from(value: f32) -> Self {
        UrlInput::from(f64::from(value))
    }
}

impl<T: Into<UrlInput>> From<Option<T>> for UrlInput {
    fn from(value: Option<T>) -> Self {
        value.map_or(UrlInput::Missing, Into::into)
    }
}

/// Sparse feature vector of fixed dimension
///
/// Entries are `(index, value)` pairs sorted by index with no duplicates and
/// every index below `dimension`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dimension: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// Create a vector from sorted sparse entries
    ///
    /// # Errors
    ///
    /// Returns a vectorization error if indices are unsorted, duplicated, out
    /// of range, or a value is not finite
    pub fn new(dimension: usize, entries: Vec<(usize, f64)>) -> ClassifyResult<Self> {
        let mut previous: Option<usize> = None;
        for &(index, value) in &entries {
            if index >= dimension {
                return Err(ClassifyError::vectorization(format!(
                    "feature index {index} out of range for dimension {dimension}"
                )));
            }
            if previous.is_some_and(|p| p >= index) {
                return Err(ClassifyError::vectorization(
                    "feature indices must be strictly increasing",
                ));
            }
            if !value.is_finite() {
                return Err(ClassifyError::vectorization(format!(
                    "feature {index} has non-finite value {value}"
                )));
            }
            previous = Some(index);
        }

        Ok(Self { dimension, entries })
    }

    /// Create a vector from a dense slice, dropping zeros
    pub fn from_dense(values: &[f64]) -> ClassifyResult<Self> {
        let entries = values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, v)| (i, *v))
            .collect();
        Self::new(values.len(), entries)
    }

    /// An all-zero vector
    pub fn zeros(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    /// Number of dimensions (vocabulary size)
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored non-zero entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over the non-zero entries in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Value at `index` (zero if not stored)
    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |(i, _)| *i)
            .map_or(0.0, |pos| self.entries[pos].1)
    }

    /// Dot product with a dense weight row of the same dimension
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.entries
            .iter()
            .map(|(i, v)| v * weights.get(*i).copied().unwrap_or(0.0))
            .sum()
    }

    /// Expand into a dense vector
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dimension];
        for &(i, v) in &self.entries {
            dense[i] = v;
        }
        dense
    }
}

/// Result of a scan as handed to the service layer: status, message, echoed URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// Classification status
    pub status: ScanStatus,
    /// Human-readable message
    pub message: String,
    /// The URL exactly as the caller supplied it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Value>,
}

impl ScanOutcome {
    /// Build the outcome for `input` from a pipeline result
    pub fn from_result(input: &UrlInput, result: &ClassifyResult<Label>) -> Self {
        match result {
            Ok(label) => Self {
                status: label.status(),
                message: label.status().default_message().to_string(),
                url: Some(input.to_json()),
            },
            Err(ClassifyError::InvalidInput { message }) => Self {
                status: ScanStatus::Error,
                message: message.clone(),
                url: None,
            },
            Err(ClassifyError::ModelUnavailable { .. }) => Self {
                status: ScanStatus::Error,
                message: "classification models are unavailable".to_string(),
                url: Some(input.to_json()),
            },
            Err(ClassifyError::Vectorization { .. } | ClassifyError::Classification { .. }) => {
                Self {
                    status: ScanStatus::Error,
                    message: ScanStatus::Error.default_message().to_string(),
                    url: Some(input.to_json()),
                }
            }
        }
    }
}
