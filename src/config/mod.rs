//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file, then environment overlay)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - All fields have defaults to allow an empty environment
//! - Validation separates syntactic (serde, env parsing) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{
    AuthConfig, Credentials, GatewayConfig, LimitsConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, UpstreamConfig,
};
pub use validation::ValidationError;
