// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Custom extractors for improved error handling
//!
//! [`JsonExtractor`] replaces `axum::Json` for request bodies so that a
//! malformed scan request is answered with a 400 and a message that says
//! what is wrong with the body, instead of axum's default rejection.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
};
use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::error::ServerError;

const MAX_JSON_PAYLOAD_SIZE: usize = 64 * 1024;

mod hints {
    pub const EMPTY_BODY: &str = "request body is empty, expected a JSON object such as {\"url\": \"https://example.com\"}";
    pub const TRUNCATED: &str = "unexpected end of JSON input, request appears to be truncated";
    pub const MISSING_COMMA: &str =
        "check for missing or extra commas between object properties or array elements";
    pub const MISSING_BRACE: &str = "check for a missing closing brace '}'";
    pub const MISSING_QUOTES: &str =
        "check for missing or improperly escaped quotes around string values";
    pub const CONTROL_CHARS: &str = "JSON contains control characters that must be escaped";
    pub const DEFAULT_SYNTAX: &str = "check JSON formatting and structure";
}

/// JSON body extractor with descriptive rejections
#[derive(Debug)]
pub struct JsonExtractor<T>(pub T);

impl<T, S> FromRequest<S> for JsonExtractor<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(content_type) = req.headers().get(header::CONTENT_TYPE)
            && let Ok(content_type) = content_type.to_str()
            && !content_type.starts_with("application/json")
        {
            return Err(json_error(format!(
                "invalid content-type: expected 'application/json', got '{content_type}'"
            )));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| json_error(format!("failed to read request body: {rejection}")))?;

        if bytes.len() > MAX_JSON_PAYLOAD_SIZE {
            return Err(json_error(format!(
                "request body too large: {} bytes (max: {} bytes)",
                bytes.len(),
                MAX_JSON_PAYLOAD_SIZE
            )));
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(json_error(hints::EMPTY_BODY));
        }

        serde_json::from_slice(&bytes)
            .map(JsonExtractor)
            .map_err(|err| json_error(describe(&err)))
    }
}

fn json_error(message: impl Into<String>) -> ServerError {
    ServerError::JsonError {
        message: message.into(),
    }
}

/// Human-readable description of a body parsing failure
fn describe(err: &serde_json::Error) -> String {
    match err.classify() {
        Category::Eof => hints::TRUNCATED.to_string(),
        Category::Syntax => format!(
            "invalid JSON syntax at line {}, column {}: {}",
            err.line(),
            err.column(),
            syntax_hint(err)
        ),
        Category::Data => format!("request body has the wrong shape: {err}"),
        Category::Io => format!("JSON parsing error: {err}"),
    }
}

fn syntax_hint(err: &serde_json::Error) -> &'static str {
    let message = err.to_string();

    if message.contains("expected `,`") || message.contains("trailing comma") {
        hints::MISSING_COMMA
    } else if message.contains("expected `}`") || message.contains("expected `:`") {
        hints::MISSING_BRACE
    } else if message.contains("key must be a string") || message.contains("expected value") {
        hints::MISSING_QUOTES
    } else if message.contains("control character") {
        hints::CONTROL_CHARS
    } else {
        hints::DEFAULT_SYNTAX
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{HeaderValue, Method},
    };
    use serde::Deserialize;
    use serde_json::Value;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct UrlBody {
        #[serde(default)]
        url: Option<Value>,
    }

    fn request(body: &str) -> Request {
        let mut req = Request::builder()
            .method(Method::POST)
            .uri("/scan")
            .body(Body::from(body.to_string()))
            .unwrap();

        req.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        req
    }

    async fn rejection(req: Request) -> String {
        match JsonExtractor::<UrlBody>::from_request(req, &()).await {
            Err(ServerError::JsonError { message }) => message,
            Err(other) => panic!("expected JsonError, got {other:?}"),
            Ok(body) => panic!("expected rejection, got {body:?}"),
        }
    }

    #[tokio::test]
    async fn parses_any_url_value() {
        let JsonExtractor(body) = JsonExtractor::<UrlBody>::from_request(
            request(r#"{"url": "http://example.com"}"#),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(body.url, Some(Value::from("http://example.com")));

        let JsonExtractor(body) =
            JsonExtractor::<UrlBody>::from_request(request(r#"{"url": 123}"#), &())
                .await
                .unwrap();
        assert_eq!(body.url, Some(Value::from(123)));

        let JsonExtractor(body) = JsonExtractor::<UrlBody>::from_request(request("{}"), &())
            .await
            .unwrap();
        assert!(body.url.is_none());
    }

    #[tokio::test]
    async fn empty_body() {
        assert!(rejection(request("")).await.contains("request body is empty"));
        assert!(rejection(request("  \n")).await.contains("request body is empty"));
    }

    #[tokio::test]
    async fn truncated_body() {
        let message = rejection(request(r#"{"url": "http://example.com""#)).await;
        assert!(message.contains("unexpected end of JSON input"));
    }

    #[tokio::test]
    async fn syntax_error_reports_position() {
        let message = rejection(request(r#"{"url": "a",, "b": 1}"#)).await;
        assert!(message.contains("invalid JSON syntax at line 1"));
    }

    #[tokio::test]
    async fn wrong_shape() {
        let message = rejection(request(r#""http://example.com""#)).await;
        assert!(message.contains("request body has the wrong shape"));
    }

    #[tokio::test]
    async fn large_payload_rejection() {
        let body = format!(r#"{{"url": "{}"}}"#, "x".repeat(MAX_JSON_PAYLOAD_SIZE));
        let message = rejection(request(&body)).await;
        assert!(message.contains("request body too large"));
    }

    #[tokio::test]
    async fn invalid_content_type() {
        let mut req = request(r#"{"url": "http://example.com"}"#);
        req.headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let message = rejection(req).await;
        assert!(message.contains("invalid content-type"));
        assert!(message.contains("text/plain"));
    }

    #[tokio::test]
    async fn missing_content_type_is_accepted() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/scan")
            .body(Body::from(r#"{"url": "http://example.com"}"#))
            .unwrap();

        assert!(
            JsonExtractor::<UrlBody>::from_request(req, &())
                .await
                .is_ok()
        );
    }
}
