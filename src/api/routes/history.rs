//! Rolling history endpoint

use axum::{Json, extract::State};

use crate::api::{state::ApiState, types::HistoryResponse};

/// GET /api/v1/history
///
/// Aggregate points oldest to newest, at most the history capacity
pub async fn get_history(State(state): State<ApiState>) -> Json<HistoryResponse> {
    let points = state.engine.history().await;

    Json(HistoryResponse {
        count: points.len(),
        points,
    })
}
