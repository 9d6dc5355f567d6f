use axum::{Json, extract::State, response::IntoResponse};

use super::{error::ApiError, models::HealthResponse, state::AppState};

/// Health check endpoint (GET /health)
///
/// The collector has no external dependency worth probing here: if the
/// process can answer, it is healthy.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        by_queue: state.config.collector.by_queue,
        interval: state.config.collector.interval.to_string(),
    })
}

/// Most recently delivered snapshot (GET /snapshot)
pub async fn latest_snapshot(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let delivered = state
        .latest
        .latest()
        .await
        .ok_or_else(|| ApiError::NotFound("no snapshot delivered yet".to_string()))?;

    Ok(Json(delivered))
}

/// Collector loop counters (GET /stats)
pub async fn collector_stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}
