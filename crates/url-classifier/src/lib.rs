// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! URL safety classification
//!
//! This crate decides whether a URL is safe (`good`) or malicious (`bad`)
//! using a fitted TF-IDF vectorizer and a multinomial naive Bayes classifier
//! exported from the training environment as JSON artifacts.
//!
//! # Architecture
//!
//! - [`tokenizer`]: splits a URL on `/` and `.` into a token string
//! - [`vectorizer`]: TF-IDF feature extraction behind the [`Vectorize`] trait
//! - [`classifier`]: naive Bayes prediction behind the [`Classify`] trait
//! - [`pipeline`]: the [`InferenceContext`] composing the three
//! - [`config`]: the versioned model registry and model sources
//! - [`error`]: classification and model loading errors
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use url_classifier::{InferenceContext, ModelSource, ModelVersion};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = ModelSource::registry("assets/models/models.yaml", ModelVersion::latest());
//! let context = InferenceContext::load(&source).await;
//!
//! let label = context.classify_url("http://example.com/home")?;
//! println!("URL is {label}");
//! # Ok(())
//! # }
//! ```

mod artifact;
pub mod classifier;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod tokenizer;
pub mod types;
pub mod vectorizer;

// Re-export main types for convenience
pub use artifact::{MULTINOMIAL_NB_KIND, SUPPORTED_FORMAT_MAJOR, TFIDF_VECTORIZER_KIND};
pub use classifier::{Classify, MultinomialNb, MultinomialNbArtifact};
pub use config::{ArtifactPaths, ModelRegistry, ModelSource};
pub use error::{ClassifyError, ClassifyResult, ModelLoadError, ModelLoadResult};
pub use pipeline::{InferenceContext, ModelStatus};
pub use tokenizer::tokenize;
pub use types::{FeatureVector, Label, ModelVersion, NormalizedUrl, ScanOutcome, UrlInput};
pub use vectorizer::{Norm, TfidfArtifact, TfidfVectorizer, Vectorize};
