//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, PORT override)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → resolved with secrets.rs into the route table and token minter
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets are named by config and read from the environment

pub mod loader;
pub mod schema;
pub mod secrets;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    InjectConfig, ListenerConfig, ProxyConfig, RouteConfig, StaticConfig, TimeoutConfig,
    TokenConfig,
};
pub use secrets::{EnvSource, ProcessEnv, Secret, SecretHeader};
pub use validation::{validate_config, ValidationError};
