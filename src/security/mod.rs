//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (take an admission slot or answer 429)
//!     → auth.rs (Basic credentials against the configured pair)
//!     → Pass to translation
//! Outgoing response:
//!     → headers.rs (hardening headers on every response)
//! ```
//!
//! # Design Decisions
//! - Fail closed: a configured gate rejects anything but an exact match
//! - Bounded work: admission is checked before anything else

pub mod auth;
pub mod headers;
pub mod limits;

pub use auth::{Access, CredentialGate};
pub use limits::{AdmissionControl, AdmissionPermit};
