// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! `OpenAPI` document definition

use shared_types::ScanStatus;
use utoipa::OpenApi;

use crate::{
    config::Environment,
    routes::handlers::{self, ScanRequest, ScanResponse},
    state::{HealthCheck, HealthStatus, ModelHealth},
};

/// `OpenAPI` document for the URL scan service
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "URL Scan API",
        description = "Classifies URLs, such as those decoded from QR codes, as safe or potentially malicious."
    ),
    paths(handlers::health_handler, handlers::scan_handler),
    components(schemas(
        ScanRequest,
        ScanResponse,
        ScanStatus,
        HealthCheck,
        HealthStatus,
        ModelHealth,
        Environment
    )),
    tags(
        (name = "scan", description = "URL classification"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;
