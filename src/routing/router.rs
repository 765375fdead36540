//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes in configuration order
//! - Resolve a path to its route and remainder
//! - Attach each route's secret injection policy
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) path prefix scan (acceptable for typical route counts)
//! - Explicit `None` rather than silent default; callers fall back to static files

use axum::http::HeaderName;
use url::Url;

use crate::config::{ConfigError, EnvSource, RouteConfig, SecretHeader, ValidationError};
use crate::routing::matcher::PathPrefixMatcher;

/// A compiled route.
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    matcher: PathPrefixMatcher,
    upstream_base: Url,
    authority: String,
    secret_header: Option<SecretHeader>,
}

impl Route {
    /// Compile a route without secret injection.
    pub fn new(name: impl Into<String>, prefix: impl Into<String>, upstream_base: Url) -> Self {
        let authority = match (upstream_base.host_str(), upstream_base.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        };
        Self {
            name: name.into(),
            matcher: PathPrefixMatcher::new(prefix),
            upstream_base,
            authority,
            secret_header: None,
        }
    }

    pub fn with_secret_header(mut self, header: SecretHeader) -> Self {
        self.secret_header = Some(header);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn upstream_base(&self) -> &Url {
        &self.upstream_base
    }

    /// Host (and non-default port) of the upstream, as sent in the `host` header.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn secret_header(&self) -> Option<&SecretHeader> {
        self.secret_header.as_ref()
    }

    /// Build the full upstream URL for a stripped path and optional raw query.
    ///
    /// The base, remainder and query are concatenated verbatim.
    pub fn target_url(&self, remainder: &str, query: Option<&str>) -> String {
        let mut target = String::with_capacity(
            self.upstream_base.as_str().len() + remainder.len() + query.map_or(0, |q| q.len() + 1),
        );
        target.push_str(self.upstream_base.as_str());
        target.push_str(remainder);
        if let Some(query) = query {
            target.push('?');
            target.push_str(query);
        }
        target
    }
}

/// Ordered, immutable route table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Compile route configs, resolving injected secrets from `env`.
    ///
    /// A route whose secret is absent is kept, with injection disabled.
    pub fn from_config(configs: &[RouteConfig], env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let mut routes = Vec::with_capacity(configs.len());

        for config in configs {
            let upstream = Url::parse(&config.upstream).map_err(|e| {
                ConfigError::Validation(vec![ValidationError::InvalidUpstream {
                    route: config.name.clone(),
                    upstream: config.upstream.clone(),
                    reason: e.to_string(),
                }])
            })?;
            let mut route = Route::new(config.name.clone(), config.prefix.clone(), upstream);

            if let Some(inject) = &config.inject {
                let header_name = HeaderName::from_bytes(inject.header.as_bytes()).map_err(|_| {
                    ConfigError::Validation(vec![ValidationError::InvalidHeaderName {
                        route: config.name.clone(),
                        header: inject.header.clone(),
                    }])
                })?;

                match env.secret(&inject.env) {
                    Some(secret) => {
                        let header = SecretHeader::new(header_name, secret).ok_or_else(|| {
                            ConfigError::InvalidSecret {
                                env: inject.env.clone(),
                            }
                        })?;
                        route = route.with_secret_header(header);
                    }
                    None => {
                        tracing::warn!(
                            route = %config.name,
                            env = %inject.env,
                            "Secret not configured, injection disabled for route"
                        );
                    }
                }
            }

            routes.push(route);
        }

        Ok(Self { routes })
    }

    /// Find the first route whose prefix matches `path`.
    ///
    /// Returns the route and the path with the prefix stripped.
    pub fn resolve<'a>(&self, path: &'a str) -> Option<(&Route, &'a str)> {
        self.routes
            .iter()
            .find_map(|route| route.matcher.strip(path).map(|rest| (route, rest)))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
