//! API request and response types

use serde::{Deserialize, Serialize};

use crate::{
    aggregation::AggregatePoint,
    monitors::{AlertCounts, RankedEntity},
    view::PollingStatus,
};

/// Response for GET /api/v1/health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub polling_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_tick: Option<String>,
}

/// Response for GET /api/v1/history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub points: Vec<AggregatePoint>,
}

/// Response for GET /api/v1/entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitiesResponse {
    pub count: usize,
    pub counts: AlertCounts,
    pub entities: Vec<RankedEntity>,
}

/// Body of PUT /api/v1/polling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingRequest {
    pub enabled: bool,
}

/// Response for GET|PUT /api/v1/polling
#[derive(Debug, Clone, Serialize)]
pub struct PollingResponse {
    pub enabled: bool,
    #[serde(flatten)]
    pub status: PollingStatus,
}
