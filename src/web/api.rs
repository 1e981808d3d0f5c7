//! Axum handlers for `/api/*` routes.
//!
//! Errors use the envelope `{ "error": <code>, "message": <text> }`.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use crate::catalog;
use crate::diagnosis::{DiagnoseError, DiagnosisInput};

use super::WebState;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a JSON error response body.
fn json_error(code: &str, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "error": code, "message": format!("{msg}") }))
}

fn diagnose_error_response(e: &DiagnoseError) -> Response {
    match e {
        DiagnoseError::InvalidMethodIndex(_) => {
            (StatusCode::BAD_REQUEST, json_error("invalid_argument", e)).into_response()
        }
        DiagnoseError::History(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, json_error("internal", e)).into_response()
        }
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /api/health
pub(super) async fn health(State(state): State<WebState>) -> Response {
    let recorder = &state.recorder;
    match recorder.history().len() {
        Ok(history_len) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": &*state.service_name,
                "catalog_codes": recorder.catalog().len(),
                "provider": recorder.provider_name(),
                "history_len": history_len,
            })),
        )
            .into_response(),
        Err(e) => diagnose_error_response(&e),
    }
}

/// GET /api/codes/{code}
pub(super) async fn lookup_code(State(state): State<WebState>, Path(code): Path<String>) -> Response {
    let catalog = state.recorder.catalog();
    let entry = catalog.get(&code);
    let body = json!({
        "code": catalog::normalize(&code),
        "found": entry.is_some(),
        "description": entry.map(|e| e.description.as_str()),
        "message": catalog.lookup(&code),
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/history
pub(super) async fn history(State(state): State<WebState>) -> Response {
    match state.recorder.history().snapshot() {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => diagnose_error_response(&e),
    }
}

/// POST /api/diagnose
///
/// Malformed bodies (missing or non-numeric `method_choice`, negative
/// numbers) get the same 400 envelope as an out-of-range method.
pub(super) async fn diagnose(
    State(state): State<WebState>,
    payload: Result<Json<DiagnosisInput>, JsonRejection>,
) -> Response {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            warn!("diagnosis body rejected: {}", rejection.body_text());
            return (StatusCode::BAD_REQUEST, json_error("invalid_argument", rejection.body_text()))
                .into_response();
        }
    };

    match tokio::time::timeout(state.request_timeout, state.recorder.diagnose(input)).await {
        Ok(Ok(diagnosis)) => (StatusCode::OK, Json(diagnosis)).into_response(),
        Ok(Err(e)) => {
            warn!("diagnosis rejected: {e}");
            diagnose_error_response(&e)
        }
        Err(_) => (
            StatusCode::GATEWAY_TIMEOUT,
            json_error("timeout", "diagnosis timed out"),
        )
            .into_response(),
    }
}
