// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Routes module
//!
//! This module provides route configuration and handlers for the URL scan server.

pub mod handlers;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use handlers::{health_handler, scan_handler};

use crate::{
    metrics::metrics_handler,
    middleware::{ScanRateLimiter, scan_rate_limit},
    openapi::{openapi_spec, swagger_ui},
    state::ServerState,
};

/// Create application routes with conditional rate limiting
pub fn create_routes(rate_limiter: ScanRateLimiter) -> Router<ServerState> {
    // Monitoring endpoints are not rate limited
    let health_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler));

    let docs_routes = Router::new()
        .route("/api-doc/openapi.json", get(openapi_spec))
        .route("/swagger-ui", get(swagger_ui));

    let mut scan_routes = Router::new().route("/scan", post(scan_handler));

    if rate_limiter.is_enabled() {
        scan_routes = scan_routes.layer(middleware::from_fn_with_state(
            rate_limiter,
            scan_rate_limit,
        ));
    }

    Router::new()
        .merge(health_routes)
        .merge(docs_routes)
        .merge(scan_routes)
}
