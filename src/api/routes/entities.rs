//! Entity ranking and alert count endpoints

use axum::{Json, extract::State};

use crate::{
    api::{state::ApiState, types::EntitiesResponse},
    monitors::AlertCounts,
};

/// GET /api/v1/entities
///
/// Running entities, most concerning first, with their alert levels
pub async fn list_entities(State(state): State<ApiState>) -> Json<EntitiesResponse> {
    let entities = state.engine.ranking().await;
    let counts = state.engine.alert_counts().await;

    Json(EntitiesResponse {
        count: entities.len(),
        counts,
        entities,
    })
}

/// GET /api/v1/alerts
pub async fn get_alert_counts(State(state): State<ApiState>) -> Json<AlertCounts> {
    Json(state.engine.alert_counts().await)
}
