//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Check upstream URLs and header names parse
//! - Detect duplicate and unreachable route prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Route order is significant; a specific prefix may precede a shorter one,
//!   but a prefix that an earlier one already covers is rejected

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a [`ProxyConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("route '{route}': prefix '{prefix}' must start with '/'")]
    InvalidPrefix { route: String, prefix: String },

    #[error("route '{route}': upstream '{upstream}' is invalid: {reason}")]
    InvalidUpstream {
        route: String,
        upstream: String,
        reason: String,
    },

    #[error("route '{route}': duplicate prefix '{prefix}'")]
    DuplicatePrefix { route: String, prefix: String },

    #[error("route '{route}': prefix '{prefix}' is unreachable behind route '{shadowed_by}'")]
    ShadowedPrefix {
        route: String,
        prefix: String,
        shadowed_by: String,
    },

    #[error("route '{route}': '{header}' is not a valid header name")]
    InvalidHeaderName { route: String, header: String },

    #[error("token.path '{0}' must start with '/'")]
    InvalidTokenPath(String),

    #[error("token.endpoint '{endpoint}' is invalid: {reason}")]
    InvalidTokenEndpoint { endpoint: String, reason: String },

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("timeouts.request_secs ({request}) must not be shorter than timeouts.upstream_secs ({upstream})")]
    RequestShorterThanUpstream { request: u64, upstream: u64 },

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    validate_routes(config, &mut errors);

    if config.token.enabled {
        if !config.token.path.starts_with('/') {
            errors.push(ValidationError::InvalidTokenPath(config.token.path.clone()));
        }
        if let Err(reason) = check_http_url(&config.token.endpoint) {
            errors.push(ValidationError::InvalidTokenEndpoint {
                endpoint: config.token.endpoint.clone(),
                reason,
            });
        }
    }

    let timeouts = &config.timeouts;
    if timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream_secs"));
    }
    if timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    } else if timeouts.request_secs < timeouts.upstream_secs {
        errors.push(ValidationError::RequestShorterThanUpstream {
            request: timeouts.request_secs,
            upstream: timeouts.upstream_secs,
        });
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_routes(config: &ProxyConfig, errors: &mut Vec<ValidationError>) {
    for (i, route) in config.routes.iter().enumerate() {
        if !route.prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPrefix {
                route: route.name.clone(),
                prefix: route.prefix.clone(),
            });
        }

        if let Err(reason) = check_http_url(&route.upstream) {
            errors.push(ValidationError::InvalidUpstream {
                route: route.name.clone(),
                upstream: route.upstream.clone(),
                reason,
            });
        }

        if let Some(inject) = &route.inject {
            if HeaderName::from_bytes(inject.header.as_bytes()).is_err() {
                errors.push(ValidationError::InvalidHeaderName {
                    route: route.name.clone(),
                    header: inject.header.clone(),
                });
            }
        }

        // First match wins, so any earlier prefix that covers this one hides it.
        let earlier = config.routes[..i]
            .iter()
            .find(|e| route.prefix.starts_with(e.prefix.as_str()));
        match earlier {
            Some(e) if e.prefix == route.prefix => {
                errors.push(ValidationError::DuplicatePrefix {
                    route: route.name.clone(),
                    prefix: route.prefix.clone(),
                });
            }
            Some(e) => {
                errors.push(ValidationError::ShadowedPrefix {
                    route: route.name.clone(),
                    prefix: route.prefix.clone(),
                    shadowed_by: e.name.clone(),
                });
            }
            None => {}
        }
    }
}

fn check_http_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{}'", other)),
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(())
}
