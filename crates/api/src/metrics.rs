// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics module
//!
//! Provides global metrics using the default Prometheus registry via macros and
//! an Axum-compatible metrics handler.

use std::sync::LazyLock;

use axum::{
    http::{StatusCode, header},
    response::Response,
};
use prometheus::{
    Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, TextEncoder,
    register_histogram_vec, register_int_counter, register_int_counter_vec, register_int_gauge,
};
use tracing::error;

/// Total number of scan requests, labeled by response `status`.
#[allow(clippy::expect_used)]
pub static SCAN_REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "url_scan_requests_total",
        "Total number of URL scan requests, labeled by status",
        &["status"]
    )
    .expect("Failed to create url_scan_requests_total counter vec")
});

/// Histogram for classification durations in seconds.
#[allow(clippy::expect_used)]
pub static CLASSIFICATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "url_scan_classification_duration_seconds",
        "URL classification durations in seconds",
        &["result"],
        vec![0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.5, 1.0]
    )
    .expect("Failed to create classification duration histogram")
});

/// Scan requests rejected by the rate limiter.
#[allow(clippy::expect_used)]
pub static THROTTLED_REQUESTS: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!(
        "url_scan_throttled_requests_total",
        "Total number of URL scan requests rejected by the rate limiter"
    )
    .expect("Failed to create throttled requests counter")
});

/// Whether classification models are loaded (1) or not (0).
#[allow(clippy::expect_used)]
pub static MODEL_AVAILABLE: LazyLock<IntGauge> = LazyLock::new(|| {
    register_int_gauge!(
        "url_scan_model_available",
        "Whether the classification models are loaded (1) or unavailable (0)"
    )
    .expect("Failed to create model availability gauge")
});

/// Increment the scan request counter
///
/// # Arguments
/// * `status` - The scan status returned to the caller (`good`, `bad` or `error`)
pub fn inc_scan_requests(status: &str) {
    SCAN_REQUESTS.with_label_values(&[status]).inc();
}

/// Observe the duration of a classification
///
/// # Arguments
/// * `result` - The predicted label or the error kind
/// * `duration_secs` - The duration of the classification in seconds
pub fn observe_classification_duration(result: &str, duration_secs: f64) {
    CLASSIFICATION_DURATION
        .with_label_values(&[result])
        .observe(duration_secs);
}

/// Count a scan request rejected by the rate limiter
pub fn inc_throttled_requests() {
    THROTTLED_REQUESTS.inc();
}

/// Record whether classification models are loaded
pub fn set_model_available(available: bool) {
    MODEL_AVAILABLE.set(i64::from(available));
}

/// Axum handler that exports metrics in Prometheus text format
pub async fn metrics_handler() -> Result<Response<String>, StatusCode> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];

    encoder.encode(&metric_families, &mut buffer).map_err(|e| {
        error!("Failed to encode metrics: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let body = String::from_utf8(buffer).map_err(|e| {
        error!("Metrics buffer is not valid UTF-8: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, encoder.format_type())
        .body(body)
        .map_err(|e| {
            error!("Failed to build metrics response: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn metrics_are_exported() {
        inc_scan_requests("good");
        observe_classification_duration("good", 0.002);
        set_model_available(true);

        let response = metrics_handler().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body();
        assert!(body.contains("url_scan_requests_total"));
        assert!(body.contains("url_scan_classification_duration_seconds"));
        assert!(body.contains("url_scan_model_available"));
        assert!(body.contains(r#"url_scan_requests_total{status="good"}"#));
    }
}
