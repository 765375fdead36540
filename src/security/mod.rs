//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Proxied request:
//!     → limits.rs (bounded body buffering)
//!     → headers.rs (strip, set host, inject secret, recompute length)
//!     → Forwarding engine
//! ```
//!
//! # Design Decisions
//! - No trust in client input: credential headers are always overwritten
//! - Fail closed: oversized bodies never reach the upstream

pub mod headers;
pub mod limits;

pub use headers::build_outbound_headers;
pub use limits::read_limited;
