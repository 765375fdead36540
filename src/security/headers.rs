//! Outbound header rewriting.
//!
//! # Responsibilities
//! - Strip hop-by-hop and origin-identifying headers
//! - Strip `accept-encoding` so upstream bodies arrive uncompressed
//! - Point `host` at the upstream
//! - Inject the route's secret header, replacing any client value
//! - Recompute `content-length` from the buffered body
//!
//! # Design Decisions
//! - Pure function over header maps; no I/O
//! - Injection runs after copying, so a client can never override a secret
//! - `content-length` is written last

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

use crate::config::SecretHeader;

/// Inbound headers never copied to the upstream.
pub const DENIED_REQUEST_HEADERS: &[HeaderName] = &[
    header::HOST,
    header::ORIGIN,
    header::REFERER,
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::ACCEPT_ENCODING,
    header::CONTENT_LENGTH,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
];

/// Non-standard hop-by-hop headers, denied by name.
const DENIED_CUSTOM_HEADERS: &[&str] = &["keep-alive", "proxy-connection"];

/// Returns true if `name` must not be forwarded upstream.
pub fn is_denied(name: &HeaderName) -> bool {
    DENIED_REQUEST_HEADERS.contains(name) || DENIED_CUSTOM_HEADERS.contains(&name.as_str())
}

/// Build the header map sent to the upstream.
///
/// `body_len` is the length of the buffered request body; `None` means the
/// request is sent without a body and without `content-length`.
pub fn build_outbound_headers(
    inbound: &HeaderMap,
    target_host: &str,
    secret: Option<&SecretHeader>,
    body_len: Option<usize>,
) -> HeaderMap {
    let mut outbound = HeaderMap::with_capacity(inbound.len() + 2);

    for (name, value) in inbound.iter() {
        if !is_denied(name) {
            outbound.append(name.clone(), value.clone());
        }
    }

    if let Ok(host) = HeaderValue::from_str(target_host) {
        outbound.insert(header::HOST, host);
    }

    if let Some(secret) = secret {
        // insert() drops every client-supplied value for this name
        outbound.insert(secret.name().clone(), secret.value().clone());
    }

    if let Some(len) = body_len {
        outbound.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }

    outbound
}
