//! Threshold configuration endpoints

use axum::{Json, extract::State};
use tracing::info;

use crate::{
    api::{error::ApiResult, state::ApiState},
    thresholds::AlertThresholds,
};

/// GET /api/v1/thresholds
pub async fn get_thresholds(State(state): State<ApiState>) -> Json<AlertThresholds> {
    Json(state.engine.thresholds().await)
}

/// PUT /api/v1/thresholds
///
/// Replaces all four thresholds at once. Rejected with 400 when a warning
/// value exceeds its critical value; the previous thresholds stay active.
pub async fn put_thresholds(
    State(state): State<ApiState>,
    Json(thresholds): Json<AlertThresholds>,
) -> ApiResult<Json<AlertThresholds>> {
    state.engine.set_thresholds(thresholds).await?;
    info!("operator updated thresholds: {thresholds:?}");

    Ok(Json(thresholds))
}
