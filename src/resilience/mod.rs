//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream attempt fails:
//!     → retries.rs (classify the failure: transient or terminal)
//!     → backoff.rs (delay before the next attempt)
//!     → upstream dispatcher sleeps, then retries or gives up
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - Only transport failures are retried; any HTTP status is an answer
//! - Retry count is bounded per request

pub mod backoff;
pub mod retries;

pub use backoff::{calculate_backoff, RetryPolicy};
pub use retries::{classify, FailureKind};
