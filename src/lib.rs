//! CORS relay gateway library.
//!
//! Forwards browser requests to third-party APIs by path prefix, injecting
//! server-held secrets and attaching CORS headers, and mints upstream tokens
//! from credentials the browser never sees.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
