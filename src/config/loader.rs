//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::secrets::EnvSource;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the listener port.
pub const PORT_ENV: &str = "PORT";

/// Error type for configuration loading and resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("PORT='{0}' is not a valid port")]
    InvalidPort(String),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("secret in {env} is not a valid header value")]
    InvalidSecret { env: String },

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML document into a config without validating it.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load the configuration file (or defaults), apply environment overrides and validate.
pub fn load_config(path: Option<&Path>, env: &dyn EnvSource) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            parse_config(&content)?
        }
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config, env)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply overrides taken from the environment.
///
/// Only `PORT` is consulted; secrets stay out of [`ProxyConfig`].
pub fn apply_env_overrides(config: &mut ProxyConfig, env: &dyn EnvSource) -> Result<(), ConfigError> {
    let Some(raw) = env.var(PORT_ENV).filter(|v| !v.trim().is_empty()) else {
        return Ok(());
    };
    let port: u16 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidPort(raw.clone()))?;
    set_port(config, port);
    Ok(())
}

/// Replace the listener port. An unparsable bind address is left for validation to report.
pub fn set_port(config: &mut ProxyConfig, port: u16) {
    if let Some(listener) = config.listener.with_port(port) {
        config.listener = listener;
    }
}
