//! Auto-refresh control endpoints

use axum::{Json, extract::State};

use crate::{
    aggregation::AggregatePoint,
    api::{
        error::ApiResult,
        state::ApiState,
        types::{PollingRequest, PollingResponse},
    },
};

async fn polling_response(state: &ApiState) -> PollingResponse {
    PollingResponse {
        enabled: state.engine.is_enabled(),
        status: state.engine.status().await,
    }
}

/// GET /api/v1/polling
pub async fn get_polling(State(state): State<ApiState>) -> Json<PollingResponse> {
    Json(polling_response(&state).await)
}

/// PUT /api/v1/polling
///
/// Switches auto-refresh on or off
pub async fn put_polling(
    State(state): State<ApiState>,
    Json(request): Json<PollingRequest>,
) -> Json<PollingResponse> {
    state.engine.set_enabled(request.enabled);
    Json(polling_response(&state).await)
}

/// POST /api/v1/poll
///
/// Runs one tick immediately, regardless of the auto-refresh setting
pub async fn poll_now(State(state): State<ApiState>) -> ApiResult<Json<AggregatePoint>> {
    let point = state.engine.poll_now().await?;
    Ok(Json(point))
}
