//! End-to-end tests for the token minting endpoint.

use axum::http::StatusCode;

mod common;
use common::{bare_config, env, Gateway, MockUpstream, Reply};

const TOKEN_PATH: &str = "/api/internal/tenant-token";
const TOKEN_REPLY: &str = r#"{"code":0,"msg":"ok","tenant_access_token":"t-abc","expire":7200}"#;

fn config_for(endpoint: String) -> cors_relay::ProxyConfig {
    let mut config = bare_config();
    config.token.enabled = true;
    config.token.endpoint = endpoint;
    config
}

fn credentials() -> std::collections::HashMap<String, String> {
    env(&[("FEISHU_APP_ID", "cli_a1b2"), ("FEISHU_APP_SECRET", "s3cr3t")])
}

#[tokio::test]
async fn test_mint_relays_upstream_reply() {
    let upstream = MockUpstream::start(Reply::ok(TOKEN_REPLY)).await;
    let config = config_for(upstream.url("/open-apis/auth/v3/tenant_access_token/internal"));
    let gateway = Gateway::start(config, credentials()).await;

    let res = gateway
        .client
        .post(gateway.url(TOKEN_PATH))
        .body("ignored")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    let body = res.text().await.unwrap();
    assert_eq!(body, TOKEN_REPLY);
    assert!(!body.contains("s3cr3t"));

    let seen = upstream.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].uri, "/open-apis/auth/v3/tenant_access_token/internal");
    assert_eq!(
        seen[0].headers["content-type"],
        "application/json; charset=utf-8"
    );
    assert_eq!(
        seen[0].headers["content-length"],
        seen[0].body.len().to_string()
    );

    let sent: serde_json::Value = serde_json::from_slice(&seen[0].body).unwrap();
    assert_eq!(sent["app_id"], "cli_a1b2");
    assert_eq!(sent["app_secret"], "s3cr3t");
}

#[tokio::test]
async fn test_missing_credentials_make_no_call() {
    let upstream = MockUpstream::start(Reply::ok(TOKEN_REPLY)).await;
    let config = config_for(upstream.url("/token"));
    let gateway = Gateway::start(config, env(&[("FEISHU_APP_ID", "cli_a1b2")])).await;

    let res = gateway
        .client
        .post(gateway.url(TOKEN_PATH))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["code"], -1);
    assert!(body["msg"].as_str().unwrap().contains("not configured"));
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn test_upstream_rejection_relayed() {
    let reply = r#"{"code":10003,"msg":"invalid param"}"#;
    let upstream = MockUpstream::start(Reply::ok(reply).status(StatusCode::BAD_REQUEST)).await;
    let gateway = Gateway::start(config_for(upstream.url("/token")), credentials()).await;

    let res = gateway
        .client
        .post(gateway.url(TOKEN_PATH))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(res.text().await.unwrap(), reply);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_502() {
    let dead = common::refused_addr().await;
    let config = config_for(format!("http://{}/token", dead));
    let gateway = Gateway::start(config, credentials()).await;

    let res = gateway
        .client
        .post(gateway.url(TOKEN_PATH))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["code"], -1);
    assert!(body["msg"].as_str().unwrap().starts_with("Proxy error: "));
}

#[tokio::test]
async fn test_only_post_mints() {
    let upstream = MockUpstream::start(Reply::ok(TOKEN_REPLY)).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(upstream.url("/token"));
    config.static_files.root = dir.path().to_path_buf();
    let gateway = Gateway::start(config, credentials()).await;

    let res = gateway
        .client
        .get(gateway.url(TOKEN_PATH))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 404);
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn test_disabled_endpoint_falls_through() {
    let upstream = MockUpstream::start(Reply::ok(TOKEN_REPLY)).await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(upstream.url("/token"));
    config.token.enabled = false;
    config.static_files.root = dir.path().to_path_buf();
    let gateway = Gateway::start(config, credentials()).await;

    let res = gateway
        .client
        .post(gateway.url(TOKEN_PATH))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED.as_u16());
    assert!(upstream.requests().is_empty());
}
