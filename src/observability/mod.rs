//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher, forwarding engine, token minter produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the trace layer span
//! - Secret values are never recorded, in logs or labels

pub mod logging;
pub mod metrics;
