//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde and the env overlay handle syntax)
//! - Credential pair is complete or absent
//! - Upstream URL is an absolute http(s) URL without query or fragment
//! - Value ranges (timeouts, limits, backoff bounds, addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before any socket is bound

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{GatewayConfig, PartialCredentials};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("auth.username is set but auth.password is missing")]
    MissingPassword,

    #[error("auth.password is set but auth.username is missing")]
    MissingUsername,

    #[error("upstream.url '{url}' is invalid: {reason}")]
    InvalidUpstreamUrl { url: String, reason: String },

    #[error("upstream.url must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("upstream.url must not carry its own query string or fragment")]
    UpstreamUrlHasQuery,

    #[error("upstream.timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("upstream.backoff_max_ms ({max}) is below upstream.backoff_base_ms ({base})")]
    BackoffCapBelowBase { base: u64, max: u64 },

    #[error("limits.max_in_flight must be greater than zero")]
    ZeroInFlight,

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("listener address '{0}' is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address '{0}' is not a valid socket address")]
    InvalidMetricsAddress(String),
}

impl From<PartialCredentials> for ValidationError {
    fn from(partial: PartialCredentials) -> Self {
        match partial {
            PartialCredentials::MissingPassword => ValidationError::MissingPassword,
            PartialCredentials::MissingUsername => ValidationError::MissingUsername,
        }
    }
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(partial) = config.auth.credentials() {
        errors.push(partial.into());
    }

    if let Err(e) = validate_upstream_url(&config.upstream.url) {
        errors.push(e);
    }

    if config.upstream.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.upstream.backoff_max_ms < config.upstream.backoff_base_ms {
        errors.push(ValidationError::BackoffCapBelowBase {
            base: config.upstream.backoff_base_ms,
            max: config.upstream.backoff_max_ms,
        });
    }

    if config.limits.max_in_flight == 0 {
        errors.push(ValidationError::ZeroInFlight);
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let bind_address = config.listener.bind_address();
    if bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(bind_address));
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse and check the upstream base URL.
pub fn validate_upstream_url(raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw).map_err(|e| ValidationError::InvalidUpstreamUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(ValidationError::UpstreamUrlHasQuery);
    }

    Ok(url)
}
