//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → request.rs (request ID)
//!     → OPTIONS        → response.rs (preflight)
//!     → token path     → token.rs (credential exchange)
//!     → route prefix   → forward.rs (relay via client.rs)
//!     → anything else  → static_files.rs
//!     → response.rs (CORS, header allowlist)
//!     → Send to client
//! ```

pub mod client;
pub mod error;
pub mod forward;
pub mod request;
pub mod response;
pub mod server;
pub mod static_files;
pub mod token;

pub use error::{MintError, ProxyError};
pub use forward::ForwardingEngine;
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::HttpServer;
pub use token::TokenMinter;
