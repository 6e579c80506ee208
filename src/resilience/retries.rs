//! Retry classification.
//!
//! # Responsibilities
//! - Map an upstream client error to a [`FailureKind`]
//! - Decide whether that kind is worth another attempt
//!
//! # Design Decisions
//! - Any HTTP status is a valid upstream answer and never reaches this module
//! - Connect, timeout and mid-response transport errors are transient
//! - Request-building, TLS certificate and redirect errors are terminal

use std::error::Error as StdError;
use std::fmt;

/// Why an upstream attempt produced no HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The attempt exceeded the configured timeout.
    Timeout,
    /// Connection refused, DNS failure, unreachable host.
    Connect,
    /// Connection reset or closed before a complete response.
    Transport,
    /// The upstream URL could not be turned into a request.
    InvalidRequest,
    /// TLS certificate validation failed.
    Tls,
    /// Redirect loop or redirect limit reached.
    Redirect,
    /// Anything we cannot classify; treated as terminal.
    Other,
}

impl FailureKind {
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            FailureKind::Timeout | FailureKind::Connect | FailureKind::Transport
        )
    }

    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Connect => "connect",
            FailureKind::Transport => "transport",
            FailureKind::InvalidRequest => "invalid_request",
            FailureKind::Tls => "tls",
            FailureKind::Redirect => "redirect",
            FailureKind::Other => "other",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a client error.
pub fn classify(err: &reqwest::Error) -> FailureKind {
    if err.is_builder() {
        return FailureKind::InvalidRequest;
    }
    if err.is_redirect() {
        return FailureKind::Redirect;
    }
    // Certificate failures surface as connect errors; check them first.
    if is_certificate_error(err) {
        return FailureKind::Tls;
    }
    if err.is_timeout() {
        return FailureKind::Timeout;
    }
    if err.is_connect() {
        return FailureKind::Connect;
    }
    if err.is_request() || err.is_body() || err.is_decode() {
        return FailureKind::Transport;
    }
    FailureKind::Other
}

fn is_certificate_error(err: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = err.source();
    while let Some(cause) = source {
        if cause.to_string().to_ascii_lowercase().contains("certificate") {
            return true;
        }
        source = cause.source();
    }
    false
}
