//! Credentialed forwarding gateway for a fixed upstream XML API.
//!
//! A single endpoint, `/nc`, takes the caller's query string (URL for GET,
//! body for anything else), checks optional Basic-Auth credentials, and
//! relays it to the upstream with bounded retry, returning the upstream
//! answer verbatim.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
