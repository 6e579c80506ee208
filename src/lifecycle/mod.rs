//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Logging → Metrics → Gateway components → Bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: every fallible step runs before the socket is bound
//! - Graceful shutdown lets admitted requests finish

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
