//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! translated query string
//!     → dispatcher.rs (GET <base>?<query>, timeout, retry loop)
//!     → resilience (classify failures, backoff)
//!     → UpstreamReply (status, content-type, body) or DispatchError
//! ```

pub mod dispatcher;

pub use dispatcher::{
    AttemptOutcome, DispatchError, Dispatched, UpstreamAttempt, UpstreamDispatcher, UpstreamReply,
    UpstreamSetupError,
};
