// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for URL classification
//!
//! Two families live here. [`ClassifyError`] is the closed set of failure
//! kinds a classification request can end in; it is what callers of the
//! inference pipeline see. [`ModelLoadError`] covers everything that can go
//! wrong while reading and validating model artifacts at startup, and is
//! folded into [`ClassifyError::ModelUnavailable`] once the context is built.

use thiserror::Error;

/// Result type alias for classification operations
pub type ClassifyResult<T> = Result<T, ClassifyError>;

/// Result type alias for model loading operations
pub type ModelLoadResult<T> = Result<T, ModelLoadError>;

/// Failure kinds of a single classification request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// Vectorizer or classifier failed to load or initialize
    #[error("Model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    /// Vectorizer could not process the tokenized input
    #[error("Vectorization error: {message}")]
    Vectorization { message: String },

    /// Classifier could not process the feature vector or produced no usable label
    #[error("Classification error: {message}")]
    Classification { message: String },

    /// URL was missing or empty
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl ClassifyError {
    /// Create a model unavailable error
    pub fn model_unavailable<T: ToString>(reason: T) -> Self {
        Self::ModelUnavailable {
            reason: reason.to_string(),
        }
    }

    /// Create a vectorization error
    pub fn vectorization<T: ToString>(message: T) -> Self {
        Self::Vectorization {
            message: message.to_string(),
        }
    }

    /// Create a classification error
    pub fn classification<T: ToString>(message: T) -> Self {
        Self::Classification {
            message: message.to_string(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input<T: ToString>(message: T) -> Self {
        Self::InvalidInput {
            message: message.to_string(),
        }
    }

    /// Short machine-readable name of the error kind, used for logs and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifyError::ModelUnavailable { .. } => "model_unavailable",
            ClassifyError::Vectorization { .. } => "vectorization_error",
            ClassifyError::Classification { .. } => "classification_error",
            ClassifyError::InvalidInput { .. } => "invalid_input",
        }
    }

    /// Check if this error means the models are not loaded
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, ClassifyError::ModelUnavailable { .. })
    }

    /// Check if this error was caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, ClassifyError::InvalidInput { .. })
    }
}

/// Errors raised while loading model artifacts and registries
#[derive(Debug, Error)]
pub enum ModelLoadError {
    /// Configuration is missing or points at unusable files
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Model registry error (version not found, invalid entry)
    #[error("Model registry error: {message}")]
    Registry { message: String },

    /// Artifact content failed validation
    #[error("Invalid model artifact: {message}")]
    Artifact { message: String },

    /// JSON serialization/deserialization error
    #[error("JSON error: {message}")]
    Json { message: String },

    /// YAML parsing error
    #[error("YAML error: {message}")]
    Yaml { message: String },

    /// I/O error (file operations)
    #[error("I/O error: {message}")]
    Io { message: String },
}

impl ModelLoadError {
    /// Create a configuration error
    pub fn config<T: ToString>(message: T) -> Self {
        Self::Configuration {
            message: message.to_string(),
        }
    }

    /// Create a registry error
    pub fn registry<T: ToString>(message: T) -> Self {
        Self::Registry {
            message: message.to_string(),
        }
    }

    /// Create an artifact validation error
    pub fn artifact<T: ToString>(message: T) -> Self {
        Self::Artifact {
            message: message.to_string(),
        }
    }

    /// Create a JSON error
    pub fn json<T: ToString>(message: T) -> Self {
        Self::Json {
            message: message.to_string(),
        }
    }

    /// Create a YAML error
    pub fn yaml<T: ToString>(message: T) -> Self {
        Self::Yaml {
            message: message.to_string(),
        }
    }

    /// Create an I/O error
    pub fn io<T: ToString>(message: T) -> Self {
        Self::Io {
            message: message.to_string(),
        }
    }

    /// Check if this error indicates a configuration problem rather than a bad artifact
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ModelLoadError::Configuration { .. } | ModelLoadError::Registry { .. }
        )
    }
}

/// Convert from JSON errors
impl From<serde_json::Error> for ModelLoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

/// Convert from YAML errors
impl From<serde_yaml::Error> for ModelLoadError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml {
            message: err.to_string(),
        }
    }
}

/// Convert from I/O errors
impl From<std::io::Error> for ModelLoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

/// A load failure leaves the service without models
impl From<ModelLoadError> for ClassifyError {
    fn from(err: ModelLoadError) -> Self {
        Self::ModelUnavailable {
            reason: err.to_string(),
        }
    }
}
