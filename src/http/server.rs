//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the gateway components from a validated configuration
//! - Create the Axum Router with the `/nc` handler
//! - Wire up middleware (security headers, request ID, tracing)
//! - Serve on a listener until shutdown

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::any;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::validation::{validate_config, ValidationError};
use crate::config::GatewayConfig;
use crate::http::handler::nc_handler;
use crate::http::request::RequestTranslator;
use crate::security::headers::with_security_headers;
use crate::security::{AdmissionControl, CredentialGate};
use crate::upstream::{UpstreamDispatcher, UpstreamSetupError};

/// Path of the single relay endpoint.
pub const NC_PATH: &str = "/nc";

/// Error building the server from configuration.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    Config(Vec<ValidationError>),

    #[error(transparent)]
    Upstream(#[from] UpstreamSetupError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<CredentialGate>,
    pub translator: RequestTranslator,
    pub dispatcher: Arc<UpstreamDispatcher>,
    pub admission: Arc<AdmissionControl>,
}

impl AppState {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, StartupError> {
        validate_config(config).map_err(StartupError::Config)?;

        // validate_config rejected partial pairs above.
        let credentials = config.auth.credentials().unwrap_or_default();

        Ok(Self {
            gate: Arc::new(CredentialGate::new(credentials, config.auth.realm.clone())),
            translator: RequestTranslator::new(config.limits.max_body_bytes),
            dispatcher: Arc::new(UpstreamDispatcher::new(&config.upstream)?),
            admission: Arc::new(AdmissionControl::new(config.limits.max_in_flight)),
        })
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    admission: Arc<AdmissionControl>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self, StartupError> {
        let state = AppState::from_config(config)?;
        let admission = state.admission.clone();

        tracing::info!(
            auth_enabled = state.gate.is_enabled(),
            max_in_flight = admission.capacity(),
            max_body_bytes = state.translator.max_body_bytes(),
            max_retries = state.dispatcher.policy().max_retries,
            "Gateway initialized"
        );

        Ok(Self {
            router: Self::build_router(state),
            admission,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let router = Router::new()
            .route(NC_PATH, any(nc_handler))
            .fallback(not_found)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        with_security_headers(router)
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Shared admission gate (in-flight count, capacity).
    pub fn admission(&self) -> Arc<AdmissionControl> {
        self.admission.clone()
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, path = NC_PATH, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found.")
}
