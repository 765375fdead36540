//! Request body limits.
//!
//! # Responsibilities
//! - Reject bodies whose declared length exceeds the limit before reading
//! - Buffer the whole body, failing once the limit is crossed
//!
//! # Design Decisions
//! - Declared-length check runs first (early rejection)
//! - A length overflow while streaming is still reported as too large, not as a read error

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap};
use http_body_util::LengthLimitError;

use crate::http::error::ProxyError;

/// Read the entire request body into memory, enforcing `limit` bytes.
pub async fn read_limited(body: Body, headers: &HeaderMap, limit: usize) -> Result<Bytes, ProxyError> {
    if let Some(declared) = declared_length(headers) {
        if declared > limit as u64 {
            return Err(ProxyError::BodyTooLarge { limit });
        }
    }

    axum::body::to_bytes(body, limit).await.map_err(|err| {
        let too_large = std::error::Error::source(&err)
            .is_some_and(|source| source.is::<LengthLimitError>());
        if too_large {
            ProxyError::BodyTooLarge { limit }
        } else {
            ProxyError::BodyRead(err.to_string())
        }
    })
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
