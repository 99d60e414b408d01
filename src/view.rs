//! Read side of the engine
//!
//! The poller is the only writer. Everything the presentation boundary shows
//! (history, ranking, alert counts, polling status) is published here once per
//! tick under a single write lock, so readers always see one consistent tick.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::{
    aggregation::AggregatePoint,
    history::HistoryBuffer,
    monitors::{AlertCounts, RankedEntity},
};

#[derive(Debug, Default)]
struct ViewState {
    history: HistoryBuffer,
    ranking: Vec<RankedEntity>,
    counts: AlertCounts,
    running_entities: usize,
    last_tick: Option<DateTime<Utc>>,
    last_error: Option<String>,
    last_error_timestamp: Option<DateTime<Utc>>,
}

/// Polling status for the operator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollingStatus {
    pub running_entities: usize,
    pub history_len: usize,
    pub history_capacity: usize,
    pub last_tick: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub last_error_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct EngineView {
    state: Arc<RwLock<ViewState>>,
}

impl EngineView {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(ViewState {
                history: HistoryBuffer::new(history_capacity),
                ..Default::default()
            })),
        }
    }

    /// Publish the result of one tick
    pub async fn record_tick(
        &self,
        point: AggregatePoint,
        ranking: Vec<RankedEntity>,
        counts: AlertCounts,
    ) {
        let mut state = self.state.write().await;
        state.last_tick = Some(point.timestamp);
        state.running_entities = point.running_entity_count;
        state.history.append(point);
        state.ranking = ranking;
        state.counts = counts;
    }

    /// Remember a failed entity-list refresh; the last tick stays visible
    pub async fn record_error(&self, message: String) {
        let mut state = self.state.write().await;
        state.last_error = Some(message);
        state.last_error_timestamp = Some(Utc::now());
    }

    pub async fn clear_error(&self) {
        let mut state = self.state.write().await;
        state.last_error = None;
        state.last_error_timestamp = None;
    }

    pub async fn history(&self) -> Vec<AggregatePoint> {
        self.state.read().await.history.snapshot()
    }

    pub async fn latest(&self) -> Option<AggregatePoint> {
        self.state.read().await.history.latest().cloned()
    }

    pub async fn ranking(&self) -> Vec<RankedEntity> {
        self.state.read().await.ranking.clone()
    }

    pub async fn counts(&self) -> AlertCounts {
        self.state.read().await.counts
    }

    pub async fn resize_history(&self, capacity: usize) {
        self.state.write().await.history.resize(capacity);
    }

    pub async fn status(&self) -> PollingStatus {
        let state = self.state.read().await;
        PollingStatus {
            running_entities: state.running_entities,
            history_len: state.history.len(),
            history_capacity: state.history.capacity(),
            last_tick: state.last_tick,
            last_error: state.last_error.clone(),
            last_error_timestamp: state.last_error_timestamp,
        }
    }
}
