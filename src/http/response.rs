//! Response relay.
//!
//! # Responsibilities
//! - Copy upstream status, content-type and body back to the caller
//! - Map gateway failures to short, non-sensitive HTTP answers
//!
//! # Design Decisions
//! - Upstream 4xx/5xx are relayed, never rewritten
//! - Missing upstream content-type defaults to XML, the upstream API's format
//! - Failure bodies name the failure kind only; upstream URLs and internal
//!   error text stay in the logs

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, Response, StatusCode};
use axum::response::IntoResponse;

use crate::http::request::TranslationError;
use crate::security::auth::challenge;
use crate::upstream::{DispatchError, UpstreamReply};

/// Content type assumed when upstream does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/xml";

/// What goes back to the caller.
#[derive(Debug, Clone)]
pub struct OutboundResponse {
    pub status: StatusCode,
    pub content_type: HeaderValue,
    pub body: Bytes,
}

impl From<UpstreamReply> for OutboundResponse {
    fn from(reply: UpstreamReply) -> Self {
        Self {
            status: reply.status,
            content_type: reply
                .content_type
                .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
            body: reply.body,
        }
    }
}

impl OutboundResponse {
    /// Build the single response for this request.
    pub fn relay(self) -> Result<Response<Body>, GatewayError> {
        Response::builder()
            .status(self.status)
            .header(header::CONTENT_TYPE, self.content_type)
            .body(Body::from(self.body))
            .map_err(GatewayError::Relay)
    }
}

/// Every way a request can end without a relayed upstream reply.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("credentials rejected")]
    AuthRejected { realm: String },

    #[error("admission slots exhausted")]
    AdmissionExhausted,

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Upstream(#[from] DispatchError),

    #[error("failed to build relay response: {0}")]
    Relay(axum::http::Error),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::AuthRejected { .. } => StatusCode::UNAUTHORIZED,
            GatewayError::AdmissionExhausted => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Translation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Relay(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::AuthRejected { .. } => "auth_rejected",
            GatewayError::AdmissionExhausted => "admission_exhausted",
            GatewayError::Translation(TranslationError::TooLarge { .. }) => "translation_too_large",
            GatewayError::Translation(_) => "translation_failed",
            GatewayError::Upstream(DispatchError::Unavailable { .. }) => "upstream_unavailable",
            GatewayError::Upstream(DispatchError::Rejected { .. }) => "upstream_failed",
            GatewayError::Relay(_) => "relay_failed",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        match self {
            GatewayError::AuthRejected { realm } => {
                let challenge = HeaderValue::from_str(&challenge(&realm))
                    .unwrap_or_else(|_| HeaderValue::from_static("Basic"));
                (
                    status,
                    [(header::WWW_AUTHENTICATE, challenge)],
                    "Authentication required.",
                )
                    .into_response()
            }
            GatewayError::AdmissionExhausted => (
                status,
                [(header::RETRY_AFTER, HeaderValue::from_static("1"))],
                "Too many requests in flight.",
            )
                .into_response(),
            GatewayError::Translation(e) => (status, e.to_string()).into_response(),
            GatewayError::Upstream(DispatchError::Unavailable { .. }) => {
                (status, "Upstream unavailable.").into_response()
            }
            GatewayError::Upstream(DispatchError::Rejected { .. }) => {
                (status, "Upstream request failed.").into_response()
            }
            GatewayError::Relay(e) => {
                tracing::error!(error = %e, "Relay failed");
                status.into_response()
            }
        }
    }
}
