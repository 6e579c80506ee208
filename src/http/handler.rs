//! The `/nc` request lifecycle.
//!
//! # States
//! ```text
//! Idle → Authenticating → Translating → Dispatching → Relaying → Done
//!   │          │               │              │
//!   └──────────┴───────────────┴──────────────┴──→ Error
//! ```
//!
//! `Idle → Error` is admission rejection. `Error` still produces a well-formed
//! response. A lifecycle dropped outside `Done`/`Error` means the caller went
//! away: the future was cancelled, the upstream call with it, and no response
//! is written.

use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request};
use axum::response::{IntoResponse, Response};

use crate::http::request::InboundRequest;
use crate::http::response::{GatewayError, OutboundResponse};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::{Access, AdmissionPermit};

/// Where a request currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Authenticating,
    Translating,
    Dispatching,
    Relaying,
    Done,
    Error,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Authenticating => "authenticating",
            Phase::Translating => "translating",
            Phase::Dispatching => "dispatching",
            Phase::Relaying => "relaying",
            Phase::Done => "done",
            Phase::Error => "error",
        }
    }
}

/// Per-request state: current phase plus the admission slot.
///
/// Dropping it releases the slot, whatever the phase.
pub struct RequestLifecycle {
    request_id: String,
    phase: Phase,
    started: Instant,
    permit: Option<AdmissionPermit>,
}

impl RequestLifecycle {
    pub fn begin(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            phase: Phase::Idle,
            started: Instant::now(),
            permit: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn admit(&mut self, permit: AdmissionPermit) {
        self.permit = Some(permit);
    }

    fn enter(&mut self, next: Phase) {
        tracing::trace!(
            request_id = %self.request_id,
            from = self.phase.as_str(),
            to = next.as_str(),
            "Phase transition"
        );
        self.phase = next;
    }

    fn complete(&mut self, response: &Response) {
        self.enter(Phase::Done);
        tracing::info!(
            request_id = %self.request_id,
            status = response.status().as_u16(),
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Request relayed"
        );
        metrics::record_request("relayed", response.status().as_u16(), self.started);
    }

    fn fail(&mut self, error: &GatewayError) {
        let failed_in = self.phase;
        self.enter(Phase::Error);
        tracing::warn!(
            request_id = %self.request_id,
            phase = failed_in.as_str(),
            kind = error.kind(),
            status = error.status().as_u16(),
            error = %error,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Request failed"
        );
        metrics::record_request(error.kind(), error.status().as_u16(), self.started);
    }
}

impl Drop for RequestLifecycle {
    fn drop(&mut self) {
        if !self.phase.is_terminal() {
            tracing::info!(
                request_id = %self.request_id,
                phase = self.phase.as_str(),
                elapsed_ms = self.started.elapsed().as_millis() as u64,
                "Request cancelled by caller"
            );
            metrics::record_cancelled(self.phase.as_str());
        }
        drop(self.permit.take());
    }
}

/// Handler for `/nc`, any method.
pub async fn nc_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let mut lifecycle = RequestLifecycle::begin(request_id(request.headers()));

    match run(&state, &mut lifecycle, request).await {
        Ok(response) => {
            lifecycle.complete(&response);
            response
        }
        Err(error) => {
            lifecycle.fail(&error);
            if matches!(error, GatewayError::AdmissionExhausted) {
                metrics::record_admission_rejected();
            }
            error.into_response()
        }
    }
}

async fn run(
    state: &AppState,
    lifecycle: &mut RequestLifecycle,
    request: Request<Body>,
) -> Result<Response, GatewayError> {
    let permit = state
        .admission
        .try_admit()
        .ok_or(GatewayError::AdmissionExhausted)?;
    lifecycle.admit(permit);

    lifecycle.enter(Phase::Authenticating);
    let (parts, body) = request.into_parts();
    let inbound = InboundRequest::from_parts(&parts);
    if state.gate.check(inbound.credentials.as_ref()) == Access::Reject {
        return Err(GatewayError::AuthRejected {
            realm: state.gate.realm().to_string(),
        });
    }

    lifecycle.enter(Phase::Translating);
    let query = state.translator.translate(&inbound, body).await?;

    lifecycle.enter(Phase::Dispatching);
    let dispatched = state.dispatcher.dispatch(&query).await?;
    tracing::debug!(
        request_id = %lifecycle.request_id,
        method = %inbound.method,
        attempts = dispatched.attempts,
        "Dispatched upstream"
    );

    lifecycle.enter(Phase::Relaying);
    OutboundResponse::from(dispatched.reply).relay()
}

fn request_id(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}
