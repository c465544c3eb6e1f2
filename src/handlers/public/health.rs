// handlers/public/health.rs - GET /health, GET /health/ping

use axum::extract::State;
use chrono::Utc;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// Liveness plus a storage round-trip; 503 when storage does not answer.
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    if let Err(e) = state.services.ping().await {
        tracing::error!(stage = "repository", error = %e, "storage health check failed");
        return Err(ApiError::service_unavailable("storage unavailable"));
    }

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "service": state.config.server.service_name,
        "timestamp": Utc::now(),
        "storage": "ok"
    })))
}

pub async fn ping(State(state): State<AppState>) -> String {
    format!("pong from {}", state.config.server.service_name)
}
