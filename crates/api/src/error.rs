// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error handling module
//!
//! This module provides error types for server operations, including HTTP
//! response mapping for both server failures and classification failures.

use std::net::SocketAddr;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use url_classifier::ClassifyError;

/// Error types for server operations
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Network binding errors
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        /// Socket address that failed to bind
        address: SocketAddr,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server startup errors
    #[error("Server startup failed: {source}")]
    Startup {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server shutdown errors
    #[error("Server shutdown failed: {source}")]
    Shutdown {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Task join errors for blocking classification work
    #[error("Task join error: {source}")]
    TaskJoin {
        /// Underlying tokio join error
        #[source]
        source: tokio::task::JoinError,
    },

    /// JSON parsing errors with detailed context
    #[error("Invalid JSON request: {message}")]
    JsonError {
        /// Detailed error message
        message: String,
    },
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::JsonError { .. } => StatusCode::BAD_REQUEST,
            ServerError::Config { .. }
            | ServerError::Bind { .. }
            | ServerError::Startup { .. }
            | ServerError::Shutdown { .. }
            | ServerError::TaskJoin { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));
        (status, body).into_response()
    }
}

/// Convenient From implementations for common async error types
impl From<tokio::task::JoinError> for ServerError {
    fn from(source: tokio::task::JoinError) -> Self {
        Self::TaskJoin { source }
    }
}

/// HTTP status code reported for a failed classification
pub fn classify_error_status(error: &ClassifyError) -> StatusCode {
    match error {
        ClassifyError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        ClassifyError::ModelUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ClassifyError::Vectorization { .. } | ClassifyError::Classification { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[test]
    fn classify_error_statuses() {
        assert_eq!(
            classify_error_status(&ClassifyError::invalid_input("no URL was provided")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            classify_error_status(&ClassifyError::model_unavailable("not loaded")),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            classify_error_status(&ClassifyError::vectorization("bad vector")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            classify_error_status(&ClassifyError::classification("no label")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn json_error_response() {
        let response = ServerError::JsonError {
            message: "request body is empty".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], 400);
        assert!(
            json["error"]
                .as_str()
                .unwrap()
                .contains("request body is empty")
        );
    }

    #[test]
    fn server_errors_are_internal() {
        let error = ServerError::Config {
            message: "bad port".to_string(),
        };
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.to_string(), "Configuration error: bad port");
    }
}
