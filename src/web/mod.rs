//! Axum-based web front-end: the questionnaire form plus a small JSON API.
//!
//! `run()` drives the axum event loop; the [`CancellationToken`] is wired to
//! axum's graceful shutdown.
//!
//! ## URL layout
//!
//! ```text
//! GET  /                    questionnaire form
//! POST /                    form submission → result page
//! GET  /favicon.ico         → 204
//! POST /api/diagnose        JSON diagnosis
//! GET  /api/codes/{code}    JSON code lookup
//! GET  /api/history         JSON list of stored records
//! GET  /api/health          JSON status
//! ```

mod api;
mod ui;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::diagnosis::DiagnosticRecorder;
use crate::error::AppError;

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone: all fields are reference-counted or `Copy`.
#[derive(Clone)]
pub struct WebState {
    /// Service name shown in page titles and the health body.
    pub service_name: Arc<str>,
    pub recorder: Arc<DiagnosticRecorder>,
    /// Upper bound on one diagnosis, assistant round-trip included.
    pub request_timeout: Duration,
}

impl WebState {
    pub fn new(service_name: &str, recorder: Arc<DiagnosticRecorder>, request_timeout: Duration) -> Self {
        Self {
            service_name: Arc::from(service_name),
            recorder,
            request_timeout,
        }
    }
}

// ── Server ────────────────────────────────────────────────────────────────────

pub struct WebServer {
    bind_addr: String,
    state: WebState,
}

impl WebServer {
    pub fn new(bind_addr: impl Into<String>, state: WebState) -> Self {
        Self { bind_addr: bind_addr.into(), state }
    }

    /// Bind, then serve until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), AppError> {
        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .map_err(|e| AppError::Http(format!("bind failed on {}: {e}", self.bind_addr)))?;
        serve(listener, self.state, shutdown).await
    }
}

/// Serve on an already-bound listener until `shutdown` is cancelled.
pub async fn serve(listener: TcpListener, state: WebState, shutdown: CancellationToken) -> Result<(), AppError> {
    let local_addr = listener.local_addr()?;
    let service = state.service_name.clone();
    let router = build_router(state);

    info!(%service, %local_addr, "web front-end listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Http(format!("axum server error: {e}")))?;

    info!(%service, "web front-end shut down");
    Ok(())
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: WebState) -> Router {
    Router::new()
        // API routes
        .route("/api/health",        get(api::health))
        .route("/api/codes/{code}",  get(api::lookup_code))
        .route("/api/history",       get(api::history))
        .route("/api/diagnose",      post(api::diagnose))
        // UI routes
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .route("/",            get(ui::index).post(ui::submit))
        .with_state(state)
}
