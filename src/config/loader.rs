//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: '{value}' ({reason})")]
    Env {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, overlay the process
/// environment and validate the result.
pub fn load(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => GatewayConfig::default(),
    };

    apply_env(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn read_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment-style key/value inputs onto `config`.
///
/// `lookup` returns the raw value for a key, or `None` when unset. Values that
/// fail to parse are reported, never ignored.
pub fn apply_env<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("HOST") {
        config.listener.host = host;
    }
    if let Some(port) = parse_var(&lookup, "PORT")? {
        config.listener.port = port;
    }

    if let Some(username) = lookup("PROXY_USER") {
        config.auth.username = Some(username);
    }
    if let Some(password) = lookup("PROXY_PASS") {
        config.auth.password = Some(password);
    }
    if let Some(realm) = lookup("PROXY_REALM") {
        config.auth.realm = realm;
    }

    if let Some(url) = lookup("UPSTREAM_URL") {
        config.upstream.url = url;
    }
    if let Some(timeout_ms) = parse_var(&lookup, "UPSTREAM_TIMEOUT_MS")? {
        config.upstream.timeout_ms = timeout_ms;
    }
    if let Some(max_retries) = parse_var(&lookup, "UPSTREAM_MAX_RETRIES")? {
        config.upstream.max_retries = max_retries;
    }
    if let Some(base) = parse_var(&lookup, "UPSTREAM_BACKOFF_MS")? {
        config.upstream.backoff_base_ms = base;
    }
    if let Some(max) = parse_var(&lookup, "UPSTREAM_BACKOFF_MAX_MS")? {
        config.upstream.backoff_max_ms = max;
    }
    if let Some(jitter) = parse_var(&lookup, "UPSTREAM_BACKOFF_JITTER")? {
        config.upstream.backoff_jitter = jitter;
    }

    if let Some(max_in_flight) = parse_var(&lookup, "MAX_IN_FLIGHT")? {
        config.limits.max_in_flight = max_in_flight;
    }
    if let Some(max_body_bytes) = parse_var(&lookup, "MAX_BODY_BYTES")? {
        config.limits.max_body_bytes = max_body_bytes;
    }

    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(format) = parse_var(&lookup, "LOG_FORMAT")? {
        config.observability.log_format = format;
    }
    if let Some(addr) = lookup("METRICS_ADDR") {
        config.observability.metrics_address = Some(addr).filter(|a| !a.is_empty());
    }

    Ok(())
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };

    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e: T::Err| ConfigError::Env {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        })
}
