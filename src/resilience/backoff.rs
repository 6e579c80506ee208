//! Exponential backoff with optional jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::UpstreamConfig;

/// Calculate exponential backoff delay: `base × 2^(attempt-1)`, capped at `max_ms`.
///
/// With `jitter`, up to 10% of the capped delay is added on top.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64, jitter: bool) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    let jitter_range = capped_delay / 10;
    let jitter = if jitter && jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

/// Retry budget for a single upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
}

impl RetryPolicy {
    /// Delay to wait before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        calculate_backoff(retry, self.base_delay_ms, self.max_delay_ms, self.jitter)
    }

    /// Whether retry number `retry` (1-based) is still within budget.
    pub fn allows(&self, retry: u32) -> bool {
        retry <= self.max_retries
    }
}

impl From<&UpstreamConfig> for RetryPolicy {
    fn from(config: &UpstreamConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay_ms: config.backoff_base_ms,
            max_delay_ms: config.backoff_max_ms,
            jitter: config.backoff_jitter,
        }
    }
}
