//! CORS relay gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                 CORS RELAY                    │
//!   Browser request       │  ┌──────────┐                                 │
//!   ──────────────────────┼─▶│ dispatch │── OPTIONS ──▶ 204 preflight      │
//!                         │  └────┬─────┘                                 │
//!                         │       ├── POST token path ──▶ token minter ───┼──▶ token API
//!                         │       ├── route prefix ──▶ forwarding engine ─┼──▶ upstream API
//!                         │       └── otherwise ──▶ static files          │
//!                         │                                               │
//!                         │  config · secrets · logging · metrics         │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use cors_relay::config::{self, ProcessEnv};
use cors_relay::lifecycle::{signals, Shutdown};
use cors_relay::observability::{logging, metrics};
use cors_relay::HttpServer;

#[derive(Parser)]
#[command(name = "cors-relay")]
#[command(about = "CORS relay and secret-injecting API gateway", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Load environment variables from this file instead of `./.env`.
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Listen port, overriding the config file and `PORT`.
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Variables already present in the environment win over the file.
    let dotenv = match &cli.env_file {
        Some(path) => dotenvy::from_path(path).map(|_| Some(path.clone())),
        None => dotenvy::dotenv().map(Some).or_else(|e| match e {
            dotenvy::Error::Io(_) => Ok(None),
            other => Err(other),
        }),
    };

    logging::init(&cli.log_level);
    tracing::info!("cors-relay v{} starting", env!("CARGO_PKG_VERSION"));

    match dotenv {
        Ok(Some(path)) => tracing::info!(path = %path.display(), "Loaded environment file"),
        Ok(None) => tracing::debug!("No .env file found"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load environment file");
            return Err(e.into());
        }
    }

    let env = ProcessEnv;
    let mut config = config::load_config(cli.config.as_deref(), &env).map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        e
    })?;
    if let Some(port) = cli.port {
        config::loader::set_port(&mut config, port);
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        static_root = %config.static_files.root.display(),
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(config, &env)?;
    log_secret_status(&server);

    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Report which secrets are configured, never their values.
fn log_secret_status(server: &HttpServer) {
    for route in server.routes().routes() {
        tracing::info!(
            route = %route.name(),
            prefix = %route.prefix(),
            upstream = %route.upstream_base(),
            secret_injected = route.secret_header().is_some(),
            "Route"
        );
    }

    let token = &server.config().token;
    if token.enabled {
        tracing::info!(
            path = %token.path,
            credentials_configured = server.token_configured(),
            "Token endpoint"
        );
    }
}
