//! Secret values and where they come from.
//!
//! # Responsibilities
//! - Abstract the process environment behind [`EnvSource`]
//! - Wrap credentials so they cannot leak through `Debug`/`Display`
//! - Pre-build sensitive header values for route injection
//!
//! # Design Decisions
//! - Secrets are read once at startup, never from request handling code
//! - Empty values count as absent

use std::collections::HashMap;
use std::fmt;

use axum::http::{HeaderName, HeaderValue};

/// Read-only view of named string values (normally the process environment).
pub trait EnvSource: Send + Sync {
    /// Returns the value for `key`, or `None` when unset.
    fn var(&self, key: &str) -> Option<String>;

    /// Returns a non-empty value for `key` as a [`Secret`].
    fn secret(&self, key: &str) -> Option<Secret> {
        self.var(key).filter(|v| !v.is_empty()).map(Secret::new)
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// An opaque credential. Formatting never reveals the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the raw value. Call sites must not log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// A header injected into outbound requests of one route.
#[derive(Debug, Clone)]
pub struct SecretHeader {
    name: HeaderName,
    value: HeaderValue,
    raw: Secret,
}

impl SecretHeader {
    /// Build the header. Returns `None` if the secret is not a valid header value.
    pub fn new(name: HeaderName, secret: Secret) -> Option<Self> {
        let mut value = HeaderValue::from_str(secret.expose()).ok()?;
        value.set_sensitive(true);
        Some(Self {
            name,
            value,
            raw: secret,
        })
    }

    pub fn name(&self) -> &HeaderName {
        &self.name
    }

    pub fn value(&self) -> &HeaderValue {
        &self.value
    }

    /// Replace every occurrence of the secret in `text` with `***`.
    pub fn redact(&self, text: &str) -> String {
        text.replace(self.raw.expose(), "***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_formatting_is_redacted() {
        let secret = Secret::new("sk-live-123");
        assert_eq!(format!("{:?}", secret), "Secret(***)");
        assert_eq!(secret.to_string(), "***");
        assert_eq!(secret.expose(), "sk-live-123");
    }

    #[test]
    fn test_empty_env_value_is_absent() {
        let env: HashMap<String, String> = [
            ("EMPTY".to_string(), String::new()),
            ("SET".to_string(), "v".to_string()),
        ]
        .into();
        assert!(env.secret("EMPTY").is_none());
        assert!(env.secret("MISSING").is_none());
        assert_eq!(env.secret("SET").unwrap().expose(), "v");
    }

    #[test]
    fn test_secret_header_is_sensitive() {
        let header = SecretHeader::new(
            HeaderName::from_static("api-key"),
            Secret::new("abc123"),
        )
        .unwrap();
        assert!(header.value().is_sensitive());
        assert!(!format!("{:?}", header).contains("abc123"));
        assert_eq!(header.redact("key=abc123;"), "key=***;");
    }

    #[test]
    fn test_secret_header_rejects_control_chars() {
        let header = SecretHeader::new(
            HeaderName::from_static("api-key"),
            Secret::new("bad\nvalue"),
        );
        assert!(header.is_none());
    }
}
