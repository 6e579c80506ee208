//! Request translation.
//!
//! # Responsibilities
//! - Capture the inbound method, URI and supplied credentials
//! - Turn the request into the upstream query string: the URL query for GET,
//!   the fully buffered body for every other method
//! - Enforce the body size limit
//!
//! # Design Decisions
//! - The body is read only after authentication, and completely, before
//!   dispatch starts; a partially read body is never relayed
//! - Parameters are opaque: no parsing, reordering or re-encoding

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::{Method, Uri};

use crate::config::Credentials;
use crate::security::auth::basic_credentials;

/// Why a request could not be turned into an upstream query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslationError {
    #[error("Request body exceeds {limit} bytes.")]
    TooLarge { limit: usize },

    #[error("Request body could not be read.")]
    Body,

    #[error("Request body is not valid UTF-8.")]
    NotUtf8,
}

/// What the gateway needs to know about a caller before touching the body.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub uri: Uri,
    pub credentials: Option<Credentials>,
}

impl InboundRequest {
    pub fn from_parts(parts: &Parts) -> Self {
        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            credentials: basic_credentials(&parts.headers),
        }
    }
}

/// Produces the upstream query string for an inbound request.
#[derive(Debug, Clone, Copy)]
pub struct RequestTranslator {
    max_body_bytes: usize,
}

impl RequestTranslator {
    pub fn new(max_body_bytes: usize) -> Self {
        Self { max_body_bytes }
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// GET: everything after the first `?` (empty if none).
    /// Anything else: the whole body, up to the configured limit.
    pub async fn translate(
        &self,
        inbound: &InboundRequest,
        body: Body,
    ) -> Result<String, TranslationError> {
        if inbound.method == Method::GET {
            return Ok(inbound.uri.query().unwrap_or_default().to_string());
        }

        let bytes = axum::body::to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|e| {
                if is_length_limit(&e) {
                    TranslationError::TooLarge {
                        limit: self.max_body_bytes,
                    }
                } else {
                    TranslationError::Body
                }
            })?;

        String::from_utf8(bytes.to_vec()).map_err(|_| TranslationError::NotUtf8)
    }
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source = Some(err as &(dyn std::error::Error + 'static));
    while let Some(cause) = source {
        if cause.is::<http_body_util::LengthLimitError>() {
            return true;
        }
        source = cause.source();
    }
    false
}
