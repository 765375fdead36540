//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.
//! Secret values never live here: routes and the token endpoint only name the
//! environment variables that hold them.

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Ordered route table. First matching prefix wins.
    pub routes: Vec<RouteConfig>,

    /// Token minting endpoint.
    pub token: TokenConfig,

    /// Static file fallback.
    pub static_files: StaticConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Upstream client behaviour.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request limits.
    pub security: SecurityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            routes: default_routes(),
            token: TokenConfig::default(),
            static_files: StaticConfig::default(),
            timeouts: TimeoutConfig::default(),
            upstream: UpstreamConfig::default(),
            observability: ObservabilityConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3200").
    pub bind_address: String,
}

impl ListenerConfig {
    /// Replace the port of the bind address, keeping the interface.
    ///
    /// Returns `None` if the current bind address is not a socket address.
    pub fn with_port(&self, port: u16) -> Option<Self> {
        let mut addr: SocketAddr = self.bind_address.parse().ok()?;
        addr.set_port(port);
        Some(Self {
            bind_address: addr.to_string(),
        })
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3200".to_string(),
        }
    }
}

/// A single prefix route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Literal path prefix, e.g. `/api/feishu/`.
    pub prefix: String,

    /// Upstream base URL. The path remainder is appended verbatim.
    pub upstream: String,

    /// Optional secret header injected into every forwarded request.
    #[serde(default)]
    pub inject: Option<InjectConfig>,
}

impl RouteConfig {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>, upstream: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            upstream: upstream.into(),
            inject: None,
        }
    }

    /// Inject the value of environment variable `env` as header `header`.
    pub fn inject(mut self, header: impl Into<String>, env: impl Into<String>) -> Self {
        self.inject = Some(InjectConfig {
            header: header.into(),
            env: env.into(),
        });
        self
    }
}

/// Secret injection policy for a route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InjectConfig {
    /// Header name set on the outbound request.
    pub header: String,

    /// Environment variable holding the secret value.
    pub env: String,
}

const GEMINI_PATH: &str = "/api/v1/beta/google/gemini/";

fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig::new("feishu", "/api/feishu/", "https://open.feishu.cn/open-apis/"),
        RouteConfig::new(
            "aihub-prod",
            "/api/aihub-prod/",
            format!("https://ai-hub.xiaopeng.com{GEMINI_PATH}"),
        )
        .inject("API-KEY", "GEMINI_API_KEY"),
        RouteConfig::new(
            "aihub-pre",
            "/api/aihub-pre/",
            format!("https://ai-hub.deploy-test.xiaopeng.com{GEMINI_PATH}"),
        )
        .inject("API-KEY", "GEMINI_API_KEY"),
        RouteConfig::new(
            "aihub-test",
            "/api/aihub-test/",
            format!("http://apisix-gw-ali-hd1.test.xiaopeng.com/xp-ai-hub-boot{GEMINI_PATH}"),
        )
        .inject("API-KEY", "GEMINI_API_KEY"),
    ]
}

/// Token minting endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Serve the minting endpoint at all.
    pub enabled: bool,

    /// Inbound path that triggers minting (POST only).
    pub path: String,

    /// Upstream URL credentials are exchanged at.
    pub endpoint: String,

    /// Environment variable holding the application id.
    pub app_id_env: String,

    /// Environment variable holding the application secret.
    pub app_secret_env: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/api/internal/tenant-token".to_string(),
            endpoint: "https://open.feishu.cn/open-apis/auth/v3/tenant_access_token/internal"
                .to_string(),
            app_id_env: "FEISHU_APP_ID".to_string(),
            app_secret_env: "FEISHU_APP_SECRET".to_string(),
        }
    }
}

/// Static file fallback configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticConfig {
    /// Directory static paths are resolved against.
    pub root: PathBuf,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Deadline for one upstream call, body included, in seconds.
    pub upstream_secs: u64,

    /// Total time for the inbound request/response in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            upstream_secs: 60,
            request_secs: 90,
        }
    }
}

/// Upstream client configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` for upstream calls.
    pub use_system_proxy: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,

    /// Bytes of an upstream error body echoed into the log.
    pub error_body_log_bytes: usize,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
            error_body_log_bytes: 1000,
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum buffered inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 20 * 1024 * 1024, // 20MB
        }
    }
}
