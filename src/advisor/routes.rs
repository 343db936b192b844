//! REST endpoints driving the advisor wizard.
//!
//! Every mutating endpoint answers with the full snapshot so a client can
//! render straight from the response.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::controller::ConversationController;
use super::model::ServiceType;
use crate::error::AdvisorError;

/// Shared state for advisor routes.
#[derive(Clone)]
pub struct AdvisorRouteState {
    pub controller: Arc<ConversationController>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceTypeRequest {
    service_type: ServiceType,
}

#[derive(Debug, Deserialize)]
struct PendingRequest {
    value: String,
    /// Toggle `value` in a multi-select answer instead of replacing it.
    #[serde(default)]
    multiple: bool,
}

#[derive(Debug, Deserialize)]
struct AnswerRequest {
    /// Submit this text; the pending answer is used when absent.
    #[serde(default)]
    answer: Option<String>,
}

/// Build the advisor REST routes.
pub fn advisor_routes(state: AdvisorRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/advisor/state", get(get_state))
        .route("/api/advisor/open", post(open))
        .route("/api/advisor/reset", post(reset))
        .route("/api/advisor/service-type", post(select_service_type))
        .route("/api/advisor/previous", post(view_previous))
        .route("/api/advisor/start-new", post(start_new))
        .route("/api/advisor/pending", post(set_pending))
        .route("/api/advisor/answer", post(submit_answer))
        .route("/api/advisor/retry", post(retry))
        .route("/api/advisor/back", post(go_back))
        .route("/api/advisor/summary", get(get_summary))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "project-advisor"
    }))
}

/// GET /api/advisor/state
async fn get_state(State(state): State<AdvisorRouteState>) -> impl IntoResponse {
    Json(state.controller.snapshot().await)
}

/// POST /api/advisor/open
async fn open(State(state): State<AdvisorRouteState>) -> impl IntoResponse {
    state.controller.open().await;
    Json(state.controller.snapshot().await)
}

/// POST /api/advisor/reset
async fn reset(State(state): State<AdvisorRouteState>) -> impl IntoResponse {
    state.controller.reset().await;
    Json(state.controller.snapshot().await)
}

/// POST /api/advisor/service-type
///
/// Body: `{"serviceType": "persona" | "empresa"}`.
async fn select_service_type(
    State(state): State<AdvisorRouteState>,
    Json(req): Json<ServiceTypeRequest>,
) -> Response {
    let result = state.controller.select_service_type(req.service_type).await;
    respond(&state, result).await
}

/// POST /api/advisor/previous
async fn view_previous(State(state): State<AdvisorRouteState>) -> Response {
    let result = state.controller.view_previous().await;
    respond(&state, result).await
}

/// POST /api/advisor/start-new
async fn start_new(State(state): State<AdvisorRouteState>) -> Response {
    let result = state.controller.start_new().await;
    respond(&state, result).await
}

/// POST /api/advisor/pending
async fn set_pending(
    State(state): State<AdvisorRouteState>,
    Json(req): Json<PendingRequest>,
) -> Response {
    let result = if req.multiple {
        state.controller.toggle_pending_multi_value(&req.value).await
    } else {
        state.controller.select_pending_answer(&req.value).await
    };
    respond(&state, result).await
}

/// POST /api/advisor/answer
async fn submit_answer(
    State(state): State<AdvisorRouteState>,
    Json(req): Json<AnswerRequest>,
) -> Response {
    let result = match req.answer {
        Some(answer) => state.controller.submit_answer(answer).await,
        None => state.controller.submit_pending().await,
    };
    respond(&state, result).await
}

/// POST /api/advisor/retry
async fn retry(State(state): State<AdvisorRouteState>) -> Response {
    let result = state.controller.retry().await;
    respond(&state, result).await
}

/// POST /api/advisor/back
async fn go_back(State(state): State<AdvisorRouteState>) -> Response {
    let result = state.controller.go_back().await.map(|_| ());
    respond(&state, result).await
}

/// GET /api/advisor/summary
///
/// The parsed recommendation, or 404 before one exists.
async fn get_summary(State(state): State<AdvisorRouteState>) -> Response {
    match state.controller.summary().await {
        Some(summary) => Json(summary).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "No recommendation yet"})),
        )
            .into_response(),
    }
}

/// Snapshot on success; error text plus snapshot otherwise.
async fn respond(state: &AdvisorRouteState, result: Result<(), AdvisorError>) -> Response {
    let snapshot = state.controller.snapshot().await;
    match result {
        Ok(()) => Json(snapshot).into_response(),
        Err(e) => (
            status_for(&e),
            Json(json!({
                "error": e.to_string(),
                "state": snapshot,
            })),
        )
            .into_response(),
    }
}

fn status_for(error: &AdvisorError) -> StatusCode {
    match error {
        AdvisorError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AdvisorError::Busy | AdvisorError::InvalidState { .. } | AdvisorError::Stale => {
            StatusCode::CONFLICT
        }
        AdvisorError::Fetch(_) => StatusCode::BAD_GATEWAY,
    }
}
