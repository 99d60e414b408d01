//! System-wide aggregation of one tick's snapshots
//!
//! ```text
//! entities + snapshot slots → sums over present snapshots → AggregatePoint
//! ```
//!
//! Every running entity is considered. An absent snapshot lowers
//! `sampled_entity_count` but adds nothing to the sums, so a failed fetch is
//! never mistaken for an idle machine.

use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    Entity, EntitySnapshot, SnapshotSlot,
    util::{bytes_to_mb, mean_or_zero, percent_of, value_or_zero},
};

/// One system-wide summary in the rolling history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatePoint {
    pub timestamp: DateTime<Utc>,
    /// Display label (`HH:MM:SS`, local time)
    pub time: String,
    pub avg_cpu_percent: f64,
    pub total_memory_used_mb: f64,
    pub total_memory_available_mb: f64,
    pub total_memory_used_percent: f64,
    pub total_disk_read_mb: f64,
    pub total_disk_write_mb: f64,
    pub total_network_rx_mb: f64,
    pub total_network_tx_mb: f64,
    /// Entities that contributed a snapshot this tick
    pub sampled_entity_count: usize,
    /// Entities the source reported as running this tick
    pub running_entity_count: usize,
}

impl AggregatePoint {
    /// A point for a tick with nothing running
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            time: time_label(timestamp),
            avg_cpu_percent: 0.0,
            total_memory_used_mb: 0.0,
            total_memory_available_mb: 0.0,
            total_memory_used_percent: 0.0,
            total_disk_read_mb: 0.0,
            total_disk_write_mb: 0.0,
            total_network_rx_mb: 0.0,
            total_network_tx_mb: 0.0,
            sampled_entity_count: 0,
            running_entity_count: 0,
        }
    }
}

fn time_label(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
}

#[derive(Debug, Default)]
struct Totals {
    cpu: f64,
    memory_used: f64,
    memory_available: f64,
    disk_read: u64,
    disk_write: u64,
    network_rx: u64,
    network_tx: u64,
    sampled: usize,
}

impl Totals {
    fn add(&mut self, snapshot: &EntitySnapshot) {
        self.cpu += value_or_zero(snapshot.cpu_usage_percent);
        self.memory_used += snapshot.memory_used_mb;
        self.memory_available += snapshot.memory_available_mb;
        self.disk_read = self.disk_read.saturating_add(snapshot.disk_read_bytes);
        self.disk_write = self.disk_write.saturating_add(snapshot.disk_write_bytes);
        self.network_rx = self.network_rx.saturating_add(snapshot.network_rx_bytes);
        self.network_tx = self.network_tx.saturating_add(snapshot.network_tx_bytes);
        self.sampled += 1;
    }
}

/// Build the aggregate point for one tick, stamped with the current time.
pub fn compute_tick(
    entities: &[Entity],
    snapshots: &HashMap<String, SnapshotSlot>,
) -> AggregatePoint {
    compute_tick_at(entities, snapshots, Utc::now())
}

/// Build the aggregate point for one tick.
///
/// Snapshots keyed by ids that are not in `entities` are ignored; only the
/// running set counts.
pub fn compute_tick_at(
    entities: &[Entity],
    snapshots: &HashMap<String, SnapshotSlot>,
    timestamp: DateTime<Utc>,
) -> AggregatePoint {
    let mut totals = Totals::default();

    for entity in entities {
        match snapshots.get(&entity.id).and_then(Option::as_ref) {
            Some(snapshot) => totals.add(snapshot),
            None => trace!("{}: no snapshot this tick", entity.id),
        }
    }

    AggregatePoint {
        timestamp,
        time: time_label(timestamp),
        avg_cpu_percent: mean_or_zero(totals.cpu, totals.sampled),
        total_memory_used_mb: totals.memory_used,
        total_memory_available_mb: totals.memory_available,
        total_memory_used_percent: percent_of(totals.memory_used, totals.memory_available),
        total_disk_read_mb: bytes_to_mb(totals.disk_read),
        total_disk_write_mb: bytes_to_mb(totals.disk_write),
        total_network_rx_mb: bytes_to_mb(totals.network_rx),
        total_network_tx_mb: bytes_to_mb(totals.network_tx),
        sampled_entity_count: totals.sampled,
        running_entity_count: entities.len(),
    }
}
