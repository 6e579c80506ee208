//! Upstream dispatch with bounded retry.
//!
//! # Responsibilities
//! - Build `<base>?<query>` for the fixed upstream endpoint
//! - Issue the GET with the configured timeout and buffer the full reply
//! - Retry transient transport failures with exponential backoff
//!
//! # Design Decisions
//! - Any HTTP status, 4xx and 5xx included, is a reply and is returned as-is
//! - Terminal failures (bad request, TLS, redirects) are never retried
//! - The query string is never logged; it carries upstream API keys

use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::{header, HeaderValue, StatusCode};
use url::Url;

use crate::config::validation::{validate_upstream_url, ValidationError};
use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::resilience::{classify, FailureKind, RetryPolicy};

/// Error building the dispatcher at startup.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamSetupError {
    #[error(transparent)]
    Url(#[from] ValidationError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A complete HTTP answer from upstream.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// Result of a single attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    Reply(UpstreamReply),
    Failed(FailureKind),
}

impl AttemptOutcome {
    fn label(&self) -> &'static str {
        match self {
            AttemptOutcome::Reply(_) => "reply",
            AttemptOutcome::Failed(kind) => kind.as_str(),
        }
    }
}

/// One iteration of the retry loop. Zero-based `index`.
#[derive(Debug)]
pub struct UpstreamAttempt {
    pub index: u32,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
}

/// A reply together with how many attempts it took.
#[derive(Debug)]
pub struct Dispatched {
    pub reply: UpstreamReply,
    pub attempts: u32,
}

/// Terminal dispatch failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// Transient failures outlasted the retry budget.
    #[error("upstream unavailable after {attempts} attempts (last failure: {last})")]
    Unavailable { attempts: u32, last: FailureKind },

    /// A failure that retrying cannot fix.
    #[error("upstream request failed ({kind}) after {attempts} attempts")]
    Rejected { kind: FailureKind, attempts: u32 },
}

/// Sends translated requests to the fixed upstream endpoint.
#[derive(Debug, Clone)]
pub struct UpstreamDispatcher {
    client: reqwest::Client,
    base_url: Url,
    policy: RetryPolicy,
}

impl UpstreamDispatcher {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamSetupError> {
        let base_url = validate_upstream_url(&config.url)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.timeout())
            .no_proxy()
            .user_agent(concat!("nc-proxy/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            policy: RetryPolicy::from(config),
        })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// `<base>?<query>`, or the bare base URL for an empty query.
    pub fn target_url(&self, query: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_query((!query.is_empty()).then_some(query));
        url
    }

    /// Relay `query` upstream, retrying transient failures.
    pub async fn dispatch(&self, query: &str) -> Result<Dispatched, DispatchError> {
        let url = self.target_url(query);
        let mut retries = 0;

        loop {
            let attempt = self.attempt(&url, retries).await;

            match attempt.outcome {
                AttemptOutcome::Reply(reply) => {
                    tracing::debug!(
                        attempt = attempt.index,
                        status = %reply.status,
                        elapsed_ms = attempt.elapsed.as_millis() as u64,
                        body_bytes = reply.body.len(),
                        "Upstream replied"
                    );
                    return Ok(Dispatched {
                        reply,
                        attempts: attempt.index + 1,
                    });
                }
                AttemptOutcome::Failed(kind) if kind.is_transient() => {
                    retries += 1;
                    if !self.policy.allows(retries) {
                        tracing::warn!(
                            attempts = retries,
                            last_failure = %kind,
                            "Upstream unavailable, retries exhausted"
                        );
                        return Err(DispatchError::Unavailable {
                            attempts: retries,
                            last: kind,
                        });
                    }

                    let delay = self.policy.delay_for(retries);
                    tracing::info!(
                        attempt = attempt.index,
                        failure = %kind,
                        elapsed_ms = attempt.elapsed.as_millis() as u64,
                        delay = ?delay,
                        "Retrying upstream request"
                    );
                    metrics::record_retry();
                    tokio::time::sleep(delay).await;
                }
                AttemptOutcome::Failed(kind) => {
                    tracing::warn!(
                        attempt = attempt.index,
                        failure = %kind,
                        "Upstream request failed, not retryable"
                    );
                    return Err(DispatchError::Rejected {
                        kind,
                        attempts: attempt.index + 1,
                    });
                }
            }
        }
    }

    async fn attempt(&self, url: &Url, index: u32) -> UpstreamAttempt {
        let start = Instant::now();

        let outcome = match self.fetch(url).await {
            Ok(reply) => AttemptOutcome::Reply(reply),
            Err(e) => {
                let kind = classify(&e);
                tracing::debug!(
                    attempt = index,
                    upstream_host = url.host_str().unwrap_or_default(),
                    failure = %kind,
                    error = %e.without_url(),
                    "Upstream attempt failed"
                );
                AttemptOutcome::Failed(kind)
            }
        };
        metrics::record_attempt(outcome.label());

        UpstreamAttempt {
            index,
            outcome,
            elapsed: start.elapsed(),
        }
    }

    async fn fetch(&self, url: &Url) -> Result<UpstreamReply, reqwest::Error> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let body = response.bytes().await?;

        Ok(UpstreamReply {
            status,
            content_type,
            body,
        })
    }
}
