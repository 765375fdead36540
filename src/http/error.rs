//! Error types for the forwarding engine and token minting.
//!
//! Both enums render themselves as JSON responses that carry the CORS origin
//! header, so a browser caller can always read the failure.

use std::error::Error as StdError;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Failures of a single proxied request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The inbound body exceeded the configured limit.
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// The inbound body could not be read.
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// The upstream call failed at the transport level.
    #[error("{}", error_chain(.0))]
    Upstream(#[from] reqwest::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::BodyRead(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let error = match &self {
            ProxyError::Upstream(_) => format!("Proxy error: {}", self),
            _ => self.to_string(),
        };
        with_cors_origin((self.status(), Json(ErrorBody { error })).into_response())
    }
}

/// Failures of the token minting endpoint.
#[derive(Debug, Error)]
pub enum MintError {
    /// One or both credentials are not configured.
    #[error("{0} not configured on the server")]
    MissingCredentials(String),

    /// The upstream call failed at the transport level.
    #[error("{}", error_chain(.0))]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for MintError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            MintError::MissingCredentials(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            MintError::Upstream(_) => (StatusCode::BAD_GATEWAY, format!("Proxy error: {}", self)),
        };
        with_cors_origin((status, Json(json!({ "code": -1, "msg": msg }))).into_response())
    }
}

fn with_cors_origin(mut response: Response) -> Response {
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

/// Render an error and its sources as `outer: inner: root`.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
