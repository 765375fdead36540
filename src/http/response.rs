//! Response handling and transformation.
//!
//! # Responsibilities
//! - Answer CORS preflight requests
//! - Attach CORS headers to relayed responses
//! - Copy only an allowlist of upstream headers back to the client
//! - Recompute `content-length` from the buffered body
//!
//! # Design Decisions
//! - Upstream bodies are fully buffered, so the length is always exact
//! - Everything outside the allowlist is dropped (cookies, upstream CORS, hop-by-hop)

use axum::body::{Body, Bytes};
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOW_HEADERS: &str = "*";
pub const PREFLIGHT_MAX_AGE: &str = "86400";

/// Upstream response headers relayed to the client.
pub const RELAYED_RESPONSE_HEADERS: &[HeaderName] = &[
    header::CONTENT_TYPE,
    header::CONTENT_ENCODING,
    header::CONTENT_DISPOSITION,
];

/// Insert the CORS headers sent on every proxied response.
pub fn insert_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
}

/// 204 reply to a CORS preflight. No body.
pub fn preflight() -> Response {
    let mut headers = HeaderMap::new();
    insert_cors_headers(&mut headers);
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(PREFLIGHT_MAX_AGE),
    );
    (StatusCode::NO_CONTENT, headers).into_response()
}

/// Build client-facing headers for a relayed upstream response.
pub fn relay_headers(upstream: &HeaderMap, body_len: usize) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert_cors_headers(&mut headers);

    for name in RELAYED_RESPONSE_HEADERS {
        for value in upstream.get_all(name) {
            headers.append(name.clone(), value.clone());
        }
    }

    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body_len));
    headers
}

/// Assemble a relayed response: upstream status, given headers, buffered body.
pub fn relayed(status: StatusCode, headers: HeaderMap, body: Bytes) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Plain-text 404 used when no route or file matches.
pub fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "404 Not Found",
    )
        .into_response()
}
