//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing, timeout, request ID, CORS origin)
//! - Resolve configuration into the route table and token minter
//! - Dispatch: preflight → token minting → proxy route → static files
//! - Serve until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request},
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ConfigError, EnvSource, ProxyConfig};
use crate::http::client::build_client;
use crate::http::forward::ForwardingEngine;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::response::{self, ALLOW_ORIGIN};
use crate::http::static_files::StaticFiles;
use crate::http::token::TokenMinter;
use crate::routing::RouteTable;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub engine: Arc<ForwardingEngine>,
    pub minter: Option<Arc<TokenMinter>>,
    pub token_path: Arc<str>,
    pub static_files: StaticFiles,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server, resolving secrets named by `config` from `env`.
    ///
    /// `config` is expected to be validated already.
    pub fn new(config: ProxyConfig, env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let client = build_client(&config.timeouts, &config.upstream)?;

        let routes = Arc::new(RouteTable::from_config(&config.routes, env)?);
        let engine = Arc::new(ForwardingEngine::new(
            client.clone(),
            config.security.max_body_size,
            config.observability.error_body_log_bytes,
        ));
        let minter = config
            .token
            .enabled
            .then(|| Arc::new(TokenMinter::from_config(&config.token, env, client)));

        let state = AppState {
            routes,
            engine,
            minter,
            token_path: Arc::from(config.token.path.as_str()),
            static_files: StaticFiles::new(&config.static_files.root),
        };

        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static(ALLOW_ORIGIN),
            ))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// A clone of the router, for driving requests without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.state.routes.len(),
            token_endpoint = self.state.minter.is_some(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Get a reference to the resolved route table.
    pub fn routes(&self) -> &RouteTable {
        &self.state.routes
    }

    /// Whether the token endpoint has both credentials.
    pub fn token_configured(&self) -> bool {
        self.state
            .minter
            .as_ref()
            .is_some_and(|minter| minter.is_configured())
    }
}

/// Main dispatch handler.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let method = request.method().clone();

    if method == Method::OPTIONS {
        return response::preflight();
    }

    let path = request.uri().path().to_string();

    if method == Method::POST && path == *state.token_path {
        if let Some(minter) = &state.minter {
            tracing::info!(request_id = %request.request_id(), "Token minting request");
            return minter.mint().await;
        }
    }

    if let Some((route, remainder)) = state.routes.resolve(&path) {
        return state.engine.forward(request, route, remainder).await;
    }

    tracing::debug!(
        request_id = %request.request_id(),
        method = %method,
        path = %path,
        "No route matched, serving static"
    );
    state.static_files.serve(request).await
}
