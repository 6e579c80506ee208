//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, security headers)
//!     → handler.rs (admission → auth → translate → dispatch → relay)
//!     → request.rs (query string from URL or body)
//!     → [upstream dispatcher]
//!     → response.rs (relay reply or map the failure)
//!     → Send to client
//! ```

pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use handler::{nc_handler, Phase, RequestLifecycle};
pub use request::{InboundRequest, RequestTranslator, TranslationError};
pub use response::{GatewayError, OutboundResponse};
pub use server::{AppState, HttpServer, StartupError, NC_PATH};
