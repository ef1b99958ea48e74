// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! URL Scan API Server Implementation
//!
//! This crate provides the HTTP server for the URL scan service, built with Axum.
//! It loads the classification models once at startup and answers `POST /scan`
//! requests by running the inference pipeline from [`url_classifier`].
//!
//! # Module Structure
//!
//! - [`config`]: Server configuration and environment management with hierarchical loading
//! - [`error`]: Error types and HTTP response handling with proper status codes
//! - [`state`]: Shared application state holding the inference context
//! - [`server`]: Main server implementation, lifecycle, and coordinated shutdown
//! - [`routes`]: Route configuration and HTTP request handlers
//! - [`middleware`]: IP-based rate limiting for the scan endpoint
//! - [`extractors`]: JSON body extraction with descriptive rejections
//! - [`metrics`]: Prometheus metrics for scan requests and model availability
//! - [`openapi`]: `OpenAPI` specification and Swagger UI endpoints
//!
//! # Key Features
//!
//! - **Degraded Startup**: Missing or broken model files leave the server running and
//!   `/scan` answering 503, while `/health` reports why
//! - **Graceful Shutdown**: Coordinated termination using `CancellationToken` with a timeout
//! - **Rate Limiting**: Optional IP-based request limiting with configurable requests per minute

pub mod config;
pub mod docs;
pub mod error;
pub mod extractors;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{Environment, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::{Server, ShutdownConfig};
pub use shared_types::ScanStatus;
pub use state::{HealthCheck, ServerState};
