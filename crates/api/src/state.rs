// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server state management module
//!
//! This module provides shared application state for the URL scan server:
//! configuration, the inference context, and coordinated cancellation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use url_classifier::{InferenceContext, ModelStatus};
use utoipa::ToSchema;

use crate::config::{Environment, ServerConfig};

/// Shared application state with cancellation token support
#[derive(Debug, Clone)]
pub struct ServerState {
    /// Server configuration
    config: ServerConfig,
    /// Loaded classification models, shared read-only by all handlers
    inference_context: Arc<InferenceContext>,
    /// Cancellation token for coordinated shutdown
    pub cancellation_token: CancellationToken,
}

impl ServerState {
    /// Create new server state
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `inference_context` - Classification models
    /// * `cancellation_token` - Token for coordinated cancellation
    pub fn new(
        config: ServerConfig,
        inference_context: Arc<InferenceContext>,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            config,
            inference_context,
            cancellation_token,
        }
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Classification models
    pub fn inference_context(&self) -> &Arc<InferenceContext> {
        &self.inference_context
    }

    /// Current service health
    ///
    /// The service stays up without models, so missing models degrade it
    /// rather than take it down.
    pub fn health_check(&self) -> HealthCheck {
        let models = ModelHealth::from(self.inference_context.status());

        let status = match &models.status {
            HealthStatus::Up => HealthStatus::Up,
            HealthStatus::Down { reason } | HealthStatus::Degraded { reason } => {
                HealthStatus::Degraded {
                    reason: format!("classification models unavailable: {reason}").into(),
                }
            }
        };

        HealthCheck {
            status,
            version: Box::from(env!("CARGO_PKG_VERSION")),
            environment: self.config.environment,
            timestamp: chrono::Utc::now().to_rfc3339(),
            models,
        }
    }
}

/// Health status of a service or dependency
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum HealthStatus {
    /// Service is fully operational and responding normally
    Up,

    /// Service is not operational or has critical failures
    Down {
        /// Human-readable explanation of why the service is down
        reason: Box<str>,
    },

    /// Service is operational but experiencing partial failures
    Degraded {
        /// Human-readable explanation of the degradation condition
        reason: Box<str>,
    },
}

/// Availability of the classification models
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ModelHealth {
    /// `Up` when models are loaded, `Down` with the load failure otherwise
    pub status: HealthStatus,
    /// Loaded model version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Feature space size of the loaded models
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_features: Option<usize>,
    /// When the models were loaded (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<String>,
}

impl From<ModelStatus> for ModelHealth {
    fn from(status: ModelStatus) -> Self {
        match status {
            ModelStatus::Available {
                version,
                n_features,
                loaded_at,
            } => Self {
                status: HealthStatus::Up,
                version: Some(version),
                n_features: Some(n_features),
                loaded_at: Some(loaded_at.to_rfc3339()),
            },
            ModelStatus::Unavailable { reason } => Self {
                status: HealthStatus::Down {
                    reason: reason.into_boxed_str(),
                },
                version: None,
                n_features: None,
                loaded_at: None,
            },
        }
    }
}

/// Health check status
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthCheck {
    /// Service status
    pub status: HealthStatus,
    /// Service version
    pub version: Box<str>,
    /// Environment
    pub environment: Environment,
    /// Timestamp
    pub timestamp: String,
    /// Classification model availability
    pub models: ModelHealth,
}
