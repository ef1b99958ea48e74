// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! URL inference pipeline
//!
//! [`InferenceContext`] owns the fitted vectorizer and classifier and composes
//! them with the tokenizer into a single [`InferenceContext::classify_url`]
//! operation. A context is built once at startup, is immutable afterwards and
//! is shared between request handlers behind an `Arc`.
//!
//! A context whose models failed to load is still a valid context: every
//! classification then fails with [`ClassifyError::ModelUnavailable`] and the
//! service keeps answering.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{Span, debug, error, field, info, instrument, warn};
use url::Url;

use crate::{
    classifier::{Classify, MultinomialNb},
    config::ModelSource,
    error::{ClassifyError, ClassifyResult, ModelLoadError, ModelLoadResult},
    tokenizer,
    types::{Label, ScanOutcome, UrlInput},
    vectorizer::{TfidfVectorizer, Vectorize},
};

/// Loaded models or the reason they are missing
#[derive(Debug)]
enum ModelState {
    Ready {
        vectorizer: Box<dyn Vectorize>,
        classifier: Box<dyn Classify>,
        version: String,
        n_features: usize,
        loaded_at: DateTime<Utc>,
    },
    Unavailable {
        reason: String,
    },
}

/// Model availability as reported by health checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ModelStatus {
    /// Models are loaded and serving
    Available {
        /// Registry version (or `unversioned` for explicit files)
        version: String,
        /// Feature space size shared by vectorizer and classifier
        n_features: usize,
        /// When the models were loaded
        loaded_at: DateTime<Utc>,
    },
    /// Models failed to load
    Unavailable {
        /// Load failure
        reason: String,
    },
}

impl ModelStatus {
    /// Check if models are loaded
    pub fn is_available(&self) -> bool {
        matches!(self, ModelStatus::Available { .. })
    }
}

/// Immutable inference context shared by all requests
#[derive(Debug)]
pub struct InferenceContext {
    state: ModelState,
}

impl InferenceContext {
    /// Build a context from fitted models
    ///
    /// A vectorizer whose dimension differs from the classifier's feature
    /// count cannot feed it, so the context comes up unavailable instead.
    pub fn new<V, C>(vectorizer: V, classifier: C, version: impl Into<String>) -> Self
    where
        V: Vectorize + 'static,
        C: Classify + 'static,
    {
        match Self::try_new(vectorizer, classifier, version) {
            Ok(context) => context,
            Err(e) => {
                error!("Classification models are incompatible: {}", e);
                Self::unavailable(e.to_string())
            }
        }
    }

    fn try_new<V, C>(
        vectorizer: V,
        classifier: C,
        version: impl Into<String>,
    ) -> ModelLoadResult<Self>
    where
        V: Vectorize + 'static,
        C: Classify + 'static,
    {
        let dimension = vectorizer.dimension();
        let n_features = classifier.n_features();
        if dimension != n_features {
            return Err(ModelLoadError::artifact(format!(
                "vectorizer produces {dimension} features but classifier expects {n_features}"
            )));
        }

        Ok(Self {
            state: ModelState::Ready {
                vectorizer: Box::new(vectorizer),
                classifier: Box::new(classifier),
                version: version.into(),
                n_features,
                loaded_at: Utc::now(),
            },
        })
    }

    /// A context without models; every classification fails with `reason`
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: ModelState::Unavailable {
                reason: reason.into(),
            },
        }
    }

    /// Load the models selected by `source`
    ///
    /// Never fails: a load error is logged and yields an unavailable context.
    #[instrument(skip_all, fields(version = %source.version_label()))]
    pub async fn load(source: &ModelSource) -> Self {
        info!("Loading classification models");

        match Self::try_load(source).await {
            Ok(context) => {
                info!("Classification models loaded");
                context
            }
            Err(e) => {
                error!("Failed to load classification models: {}", e);
                Self::unavailable(e.to_string())
            }
        }
    }

    async fn try_load(source: &ModelSource) -> ModelLoadResult<Self> {
        let paths = source.resolve().await?;
        let vectorizer = TfidfVectorizer::from_file(&paths.vectorizer).await?;
        let classifier = MultinomialNb::from_file(&paths.classifier).await?;
        Self::try_new(vectorizer, classifier, source.version_label())
    }

    /// Check if models are loaded
    pub fn is_available(&self) -> bool {
        matches!(self.state, ModelState::Ready { .. })
    }

    /// Current model availability
    pub fn status(&self) -> ModelStatus {
        match &self.state {
            ModelState::Ready {
                version,
                n_features,
                loaded_at,
                ..
            } => ModelStatus::Available {
                version: version.clone(),
                n_features: *n_features,
                loaded_at: *loaded_at,
            },
            ModelState::Unavailable { reason } => ModelStatus::Unavailable {
                reason: reason.clone(),
            },
        }
    }

    /// Classify a URL as good or bad
    ///
    /// Non-string inputs are coerced to their canonical string form and
    /// logged as an anomaly. Missing or empty input is rejected before the
    /// models are consulted.
    ///
    /// # Errors
    ///
    /// Returns the [`ClassifyError`] kind of the first failing step.
    #[instrument(skip_all, fields(host = field::Empty))]
    pub fn classify_url(&self, input: impl Into<UrlInput>) -> ClassifyResult<Label> {
        let input = input.into();
        let start_time = Instant::now();

        let result = self.run(&input);

        let duration_ms = start_time.elapsed().as_millis() as u64;
        match &result {
            Ok(label) => info!(label = %label, duration_ms, "URL classified"),
            Err(e) => warn!(
                error_kind = e.kind(),
                duration_ms, "URL classification failed: {}", e
            ),
        }

        result
    }

    /// Classify a URL and shape the result for the caller
    pub fn scan(&self, input: impl Into<UrlInput>) -> ScanOutcome {
        let input = input.into();
        let result = self.classify_url(input.clone());
        ScanOutcome::from_result(&input, &result)
    }

    fn run(&self, input: &UrlInput) -> ClassifyResult<Label> {
        let url = input.normalize()?;
        if let Some(source_type) = url.coerced_from() {
            warn!(
                "URL is not a string (got {}), classifying its text form '{}'",
                source_type,
                url.as_str()
            );
        }

        if let Some(host) = Url::parse(url.as_str())
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_owned))
        {
            Span::current().record("host", field::display(&host));
        }

        let (vectorizer, classifier) = match &self.state {
            ModelState::Ready {
                vectorizer,
                classifier,
                ..
            } => (vectorizer, classifier),
            ModelState::Unavailable { reason } => {
                return Err(ClassifyError::model_unavailable(reason));
            }
        };

        let tokens = tokenizer::tokens(url.as_str());
        debug!(token_count = tokens.len(), "Tokenized URL");

        let features = vectorizer.vectorize(&tokenizer::join(&tokens))?;
        debug!(nnz = features.nnz(), "Vectorized URL");

        classifier.classify(&features)
    }
}
