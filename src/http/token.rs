//! Server-side token minting.
//!
//! Exchanges the stored application credentials for a short-lived upstream
//! access token. The caller only ever sees the upstream's reply, never the
//! credentials.

use std::time::Instant;

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::config::{EnvSource, Secret, TokenConfig};
use crate::http::error::MintError;
use crate::http::forward::truncate_lossy;
use crate::http::response::{relayed, ALLOW_ORIGIN};
use crate::observability::metrics;

const ERROR_BODY_LOG_BYTES: usize = 500;
const METRICS_ROUTE: &str = "token";

/// Application credentials read at startup.
#[derive(Debug, Clone)]
pub struct Credentials {
    app_id: Secret,
    app_secret: Secret,
}

impl Credentials {
    pub fn new(app_id: Secret, app_secret: Secret) -> Self {
        Self { app_id, app_secret }
    }
}

/// Fixed-destination relay for the token endpoint.
#[derive(Debug, Clone)]
pub struct TokenMinter {
    endpoint: String,
    credentials: Option<Credentials>,
    missing: String,
    client: reqwest::Client,
}

impl TokenMinter {
    pub fn new(endpoint: impl Into<String>, credentials: Option<Credentials>, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            credentials,
            missing: "application credentials".to_string(),
            client,
        }
    }

    /// Resolve credentials named by `config` from `env`.
    pub fn from_config(
        config: &TokenConfig,
        env: &dyn EnvSource,
        client: reqwest::Client,
    ) -> Self {
        let credentials = match (env.secret(&config.app_id_env), env.secret(&config.app_secret_env)) {
            (Some(app_id), Some(app_secret)) => Some(Credentials::new(app_id, app_secret)),
            _ => None,
        };
        let mut minter = Self::new(config.endpoint.clone(), credentials, client);
        minter.missing = format!("{} / {}", config.app_id_env, config.app_secret_env);
        minter
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Mint a token and relay the upstream reply.
    pub async fn mint(&self) -> Response {
        let start = Instant::now();
        let response = match self.exchange(start).await {
            Ok(response) => response,
            Err(err) => {
                match &err {
                    MintError::MissingCredentials(_) => {
                        tracing::error!(error = %err, "Token minting not configured");
                    }
                    MintError::Upstream(_) => {
                        tracing::error!(
                            elapsed_ms = start.elapsed().as_millis() as u64,
                            error = %err,
                            "Token request failed"
                        );
                        metrics::record_upstream_error(METRICS_ROUTE);
                    }
                }
                err.into_response()
            }
        };

        metrics::record_request(METRICS_ROUTE, "POST", response.status().as_u16(), start);
        response
    }

    async fn exchange(&self, start: Instant) -> Result<Response, MintError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| MintError::MissingCredentials(self.missing.clone()))?;

        let payload = json!({
            "app_id": credentials.app_id.expose(),
            "app_secret": credentials.app_secret.expose(),
        })
        .to_string();

        let upstream = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
            .header(header::CONTENT_LENGTH, payload.len())
            .body(payload)
            .send()
            .await?;

        let status = upstream.status();
        let body = upstream.bytes().await?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        tracing::info!(status = status.as_u16(), elapsed_ms, "Token endpoint responded");
        if status.as_u16() >= 400 {
            tracing::warn!(
                status = status.as_u16(),
                body = %truncate_lossy(&body, ERROR_BODY_LOG_BYTES),
                "Token endpoint returned error status"
            );
        }

        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        );
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));

        Ok(relayed(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_credentials_need_both_values() {
        let config = TokenConfig::default();
        let client = reqwest::Client::new();

        let partial = env(&[("FEISHU_APP_ID", "cli_1")]);
        let minter = TokenMinter::from_config(&config, &partial, client.clone());
        assert!(!minter.is_configured());

        let full = env(&[("FEISHU_APP_ID", "cli_1"), ("FEISHU_APP_SECRET", "s3cr3t")]);
        let minter = TokenMinter::from_config(&config, &full, client);
        assert!(minter.is_configured());
        assert!(!format!("{:?}", minter).contains("s3cr3t"));
    }

    #[tokio::test]
    async fn test_missing_credentials_short_circuit() {
        let config = TokenConfig {
            // unroutable: any network attempt would fail with 502, not 500
            endpoint: "http://127.0.0.1:9/never".into(),
            ..TokenConfig::default()
        };
        let minter = TokenMinter::from_config(&config, &env(&[]), reqwest::Client::new());

        let response = minter.mint().await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], -1);
        assert_eq!(
            json["msg"],
            "FEISHU_APP_ID / FEISHU_APP_SECRET not configured on the server"
        );
    }
}
