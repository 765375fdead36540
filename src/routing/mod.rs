//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming path
//!     → router.rs (ordered scan)
//!     → matcher.rs (literal prefix test + strip)
//!     → Return: (Route, remainder) or no match
//!
//! Route Compilation (at startup):
//!     RouteConfig[] + environment secrets
//!     → Compile matchers, parse upstream URLs
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (table order)

pub mod matcher;
pub mod router;

pub use router::{Route, RouteTable};
