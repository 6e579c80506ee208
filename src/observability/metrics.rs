//! Metrics collection and exposition.
//!
//! # Metrics
//! - `nc_proxy_requests_total` (counter): finished requests by outcome and status
//! - `nc_proxy_request_duration_seconds` (histogram): end-to-end latency
//! - `nc_proxy_upstream_attempts_total` (counter): upstream attempts by result
//! - `nc_proxy_upstream_retries_total` (counter): backoff-and-retry cycles
//! - `nc_proxy_admission_rejected_total` (counter): 429 answers
//! - `nc_proxy_requests_cancelled_total` (counter): callers that went away
//! - `nc_proxy_in_flight` (gauge): admission slots in use

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record a finished request.
pub fn record_request(outcome: &'static str, status: u16, start: Instant) {
    counter!(
        "nc_proxy_requests_total",
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("nc_proxy_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record one upstream attempt; `result` is `"reply"` or a failure kind label.
pub fn record_attempt(result: &'static str) {
    counter!("nc_proxy_upstream_attempts_total", "result" => result).increment(1);
}

pub fn record_retry() {
    counter!("nc_proxy_upstream_retries_total").increment(1);
}

pub fn record_admission_rejected() {
    counter!("nc_proxy_admission_rejected_total").increment(1);
}

pub fn record_cancelled(phase: &'static str) {
    counter!("nc_proxy_requests_cancelled_total", "phase" => phase).increment(1);
}

pub fn set_in_flight(in_flight: usize) {
    gauge!("nc_proxy_in_flight").set(in_flight as f64);
}
