pub mod actors;
pub mod aggregation;
pub mod api;
pub mod config;
pub mod error;
pub mod history;
pub mod monitors;
pub mod source;
pub mod thresholds;
pub mod util;
pub mod view;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use error::{EngineError, EngineResult};

/// A running virtual machine as reported by the snapshot source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub allocated_cpu_count: u32,
    pub allocated_memory_mb: u64,
}

/// One point-in-time resource reading for a single entity.
///
/// Disk and network counters are whatever the source provides (cumulative or
/// per-interval), as long as the source is consistent between ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub entity_id: String,
    pub timestamp: DateTime<Utc>,
    /// CPU usage in percent (0-100), if the source could measure it
    #[serde(default)]
    pub cpu_usage_percent: Option<f64>,
    #[serde(default)]
    pub memory_used_mb: f64,
    #[serde(default)]
    pub memory_available_mb: f64,
    #[serde(default)]
    pub disk_read_bytes: u64,
    #[serde(default)]
    pub disk_write_bytes: u64,
    #[serde(default)]
    pub network_rx_bytes: u64,
    #[serde(default)]
    pub network_tx_bytes: u64,
}

impl EntitySnapshot {
    /// Memory usage of this entity in percent, `0` when nothing is available.
    pub fn memory_used_percent(&self) -> f64 {
        util::percent_of(self.memory_used_mb, self.memory_available_mb)
    }
}

/// Snapshot for one entity in one tick; `None` means the reading is absent.
pub type SnapshotSlot = Option<EntitySnapshot>;
