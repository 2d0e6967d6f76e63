//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use riskdesk_core::{DecisionBundle, SupportRequest};
use riskdesk_telemetry::MetricsSnapshot;
use serde_json::json;
use tracing::{debug, error};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/stats", get(stats))
        .route("/support", post(support))
        .with_state(state)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

async fn stats(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.stats.snapshot())
}

/// Classify one support request and return the decision bundle
async fn support(
    State(state): State<AppState>,
    payload: Result<Json<SupportRequest>, JsonRejection>,
) -> Result<Json<DecisionBundle>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        state.stats.record_rejected();
        AppError::InvalidRequest(rejection.body_text())
    })?;

    debug!(customer_id = %request.customer_id, "Received support request");

    match state.orchestrator.classify(&request).await {
        Ok(outcome) => Ok(Json(outcome.bundle)),
        Err(e) if e.is_client_error() => {
            state.stats.record_rejected();
            Err(AppError::InvalidRequest(e.to_string()))
        }
        Err(e) => {
            error!(error = %e, fatal = e.is_fatal(), "Classification failed");
            Err(AppError::InternalError(e.to_string()))
        }
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    InvalidRequest(String),
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_request_error", msg),
            AppError::InternalError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
            }
        };

        let body = json!({
            "error": {
                "message": message,
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}
