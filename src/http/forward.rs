//! Forwarding engine.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → buffer body (GET/HEAD: none)
//!     → target = upstream_base + remainder + query
//!     → security::headers (strip, host, secret, content-length)
//!     → one upstream call (no retry)
//!     → buffer upstream body
//!     → response.rs (CORS, allowlist, content-length)
//!     → client
//! ```
//!
//! # Design Decisions
//! - Both legs are fully buffered; nothing reaches the client until the
//!   upstream body is complete, so a failure is always a clean 502
//! - Status and body are relayed verbatim, including upstream errors
//! - Secrets are never logged; error-body snippets are redacted

use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::http::{Method, Request};
use axum::response::{IntoResponse, Response};

use crate::config::SecretHeader;
use crate::http::error::ProxyError;
use crate::http::response::{relay_headers, relayed};
use crate::observability::metrics;
use crate::routing::Route;
use crate::security::{build_outbound_headers, read_limited};

/// Relays requests to the upstream of a matched route.
#[derive(Debug, Clone)]
pub struct ForwardingEngine {
    client: reqwest::Client,
    max_body_size: usize,
    error_body_log_bytes: usize,
}

impl ForwardingEngine {
    pub fn new(client: reqwest::Client, max_body_size: usize, error_body_log_bytes: usize) -> Self {
        Self {
            client,
            max_body_size,
            error_body_log_bytes,
        }
    }

    /// Forward `request` to `route`, with the matched prefix already stripped into `remainder`.
    ///
    /// Always produces a response; transport failures become 502.
    pub async fn forward(&self, request: Request<Body>, route: &Route, remainder: &str) -> Response {
        let start = Instant::now();
        let method = request.method().clone();
        let target = route.target_url(remainder, request.uri().query());

        tracing::info!(
            route = %route.name(),
            method = %method,
            path = %request.uri().path(),
            target = %target,
            "Proxying request"
        );

        let response = match self.relay(request, route, &target, start).await {
            Ok(response) => response,
            Err(err) => {
                if let ProxyError::Upstream(_) = err {
                    tracing::error!(
                        route = %route.name(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        error = %err,
                        target = %target,
                        "Upstream request failed"
                    );
                    metrics::record_upstream_error(route.name());
                } else {
                    tracing::warn!(route = %route.name(), error = %err, "Rejected inbound body");
                }
                err.into_response()
            }
        };

        metrics::record_request(route.name(), method.as_str(), response.status().as_u16(), start);
        response
    }

    async fn relay(
        &self,
        request: Request<Body>,
        route: &Route,
        target: &str,
        start: Instant,
    ) -> Result<Response, ProxyError> {
        let (parts, body) = request.into_parts();

        let body = if carries_body(&parts.method) {
            Some(read_limited(body, &parts.headers, self.max_body_size).await?)
        } else {
            None
        };

        let headers = build_outbound_headers(
            &parts.headers,
            route.authority(),
            route.secret_header(),
            body.as_ref().map(Bytes::len),
        );

        let mut outbound = self
            .client
            .request(parts.method.clone(), target)
            .headers(headers);
        if let Some(body) = body {
            outbound = outbound.body(body);
        }

        let upstream = outbound.send().await?;
        let status = upstream.status();
        let upstream_headers = upstream.headers().clone();
        let body = upstream.bytes().await?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        if status.as_u16() >= 400 {
            tracing::warn!(
                route = %route.name(),
                status = status.as_u16(),
                elapsed_ms,
                target = %target,
                body = %self.error_snippet(&body, route.secret_header()),
                "Upstream returned error status"
            );
        } else {
            tracing::info!(
                route = %route.name(),
                status = status.as_u16(),
                elapsed_ms,
                target = %target,
                "Upstream responded"
            );
        }

        let headers = relay_headers(&upstream_headers, body.len());
        Ok(relayed(status, headers, body))
    }

    fn error_snippet(&self, body: &[u8], secret: Option<&SecretHeader>) -> String {
        let snippet = truncate_lossy(body, self.error_body_log_bytes);
        match secret {
            Some(secret) => secret.redact(&snippet),
            None => snippet,
        }
    }
}

/// GET and HEAD are forwarded without a body.
fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}

/// First `limit` bytes of `body` as text, replacing invalid UTF-8.
pub(crate) fn truncate_lossy(body: &[u8], limit: usize) -> String {
    let end = body.len().min(limit);
    String::from_utf8_lossy(&body[..end]).into_owned()
}
