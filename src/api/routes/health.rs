//! Health check endpoint

use axum::{Json, extract::State};

use crate::api::{state::ApiState, types::HealthResponse};

/// GET /api/v1/health
///
/// Liveness plus a hint whether ticks are still arriving
pub async fn health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    let status = state.engine.status().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        polling_enabled: state.engine.is_enabled(),
        last_tick: status.last_tick.map(|t| t.to_rfc3339()),
    })
}
