//! Health check handler

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// GET /health
///
/// Probes the record store; 503 when it is unreachable.
pub async fn health(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state
        .store
        .ping()
        .await
        .map_err(|e| ApiError::Unavailable(format!("Record store unreachable: {}", e)))?;

    Ok(Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now(),
    }))
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
