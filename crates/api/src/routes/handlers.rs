// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP request handlers module
//!
//! This module provides the health check and URL scan handlers.

use std::time::Instant;

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::ScanStatus;
use tracing::{info, instrument};
use url_classifier::{ScanOutcome, UrlInput};
use utoipa::ToSchema;

use crate::{
    error::{ServerError, classify_error_status},
    extractors::JsonExtractor,
    metrics,
    state::{HealthCheck, ServerState},
};

/// Health check endpoint handler
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    summary = "Health check endpoint",
    description = "Returns the current health status of the service including version, environment and whether the classification models are loaded.",
    responses(
        (status = 200, description = "Service is responding", body = HealthCheck)
    )
)]
pub async fn health_handler(State(state): State<ServerState>) -> Json<HealthCheck> {
    Json(state.health_check())
}

/// URL scan request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScanRequest {
    /// URL to classify; non-string values are classified by their text form
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "http://example.com/home")]
    pub url: Option<Value>,
}

/// URL scan result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ScanResponse {
    /// Classification status
    pub status: ScanStatus,
    /// Human-readable explanation
    #[schema(example = "this URL is safe")]
    pub message: String,
    /// The URL as it was submitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "http://example.com/home")]
    pub url: Option<Value>,
}

impl From<ScanOutcome> for ScanResponse {
    fn from(outcome: ScanOutcome) -> Self {
        Self {
            status: outcome.status,
            message: outcome.message,
            url: outcome.url,
        }
    }
}

/// Classify a URL as safe or malicious
///
/// The classification itself is CPU-bound and runs on the blocking pool.
///
/// # Errors
///
/// Returns `ServerError` if the request body is malformed or the
/// classification task fails to complete.
#[utoipa::path(
    post,
    path = "/scan",
    tag = "scan",
    summary = "Classify a URL",
    description = "Classifies the submitted URL as `good` (safe) or `bad` (may pose a security risk) using the loaded classification models.",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "URL classified", body = ScanResponse),
        (status = 400, description = "No URL was provided or the body is not valid JSON", body = ScanResponse),
        (status = 429, description = "Rate limit exceeded"),
        (status = 500, description = "The URL could not be classified", body = ScanResponse),
        (status = 503, description = "Classification models are unavailable", body = ScanResponse)
    )
)]
#[instrument(skip_all)]
pub async fn scan_handler(
    State(state): State<ServerState>,
    JsonExtractor(request): JsonExtractor<ScanRequest>,
) -> Result<(StatusCode, Json<ScanResponse>), ServerError> {
    let input = UrlInput::from_json(request.url);
    info!(url = %input.to_json(), "URL scan request received");

    let context = state.inference_context().clone();
    let task_input = input.clone();
    let start_time = Instant::now();
    let result = tokio::task::spawn_blocking(move || context.classify_url(task_input)).await?;
    let duration = start_time.elapsed();

    let (status_code, result_label) = match &result {
        Ok(label) => (StatusCode::OK, label.as_str()),
        Err(e) => (classify_error_status(e), e.kind()),
    };
    metrics::observe_classification_duration(result_label, duration.as_secs_f64());

    let response = ScanResponse::from(ScanOutcome::from_result(&input, &result));
    metrics::inc_scan_requests(response.status.as_str());

    info!(
        status = %response.status,
        http_status = status_code.as_u16(),
        duration_ms = duration.as_millis() as u64,
        "URL scan completed"
    );

    Ok((status_code, Json(response)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use tokio_util::sync::CancellationToken;
    use url_classifier::InferenceContext;

    use super::*;
    use crate::config::ServerConfig;

    fn state_without_models() -> ServerState {
        ServerState::new(
            ServerConfig::for_testing(),
            Arc::new(InferenceContext::unavailable("models.yaml not found")),
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn scan_without_models_is_unavailable() {
        let request = ScanRequest {
            url: Some(json!("http://example.com")),
        };
        let (status, Json(response)) =
            scan_handler(State(state_without_models()), JsonExtractor(request))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.status, ScanStatus::Error);
        assert_eq!(response.url, Some(json!("http://example.com")));
    }

    #[tokio::test]
    async fn scan_without_url_is_bad_request() {
        let request = ScanRequest { url: None };
        let (status, Json(response)) =
            scan_handler(State(state_without_models()), JsonExtractor(request))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response.message, "no URL was provided");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"status": "error", "message": "no URL was provided"})
        );
    }

    #[tokio::test]
    async fn health_reports_missing_models() {
        let Json(health) = health_handler(State(state_without_models())).await;
        assert!(health.models.version.is_none());
    }
}
