//! Per-entity alert classification
//!
//! ```text
//! percent >= critical → Critical
//! percent >= warning  → Warning
//! otherwise           → None
//! ```
//!
//! A value sitting exactly on a threshold takes the higher severity. An
//! absent snapshot reads as 0% for both metrics.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Entity, EntitySnapshot, thresholds::AlertThresholds, util::value_or_zero};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    #[default]
    None,
    Warning,
    Critical,
}

impl AlertLevel {
    pub fn evaluate(percent: f64, warning: f64, critical: f64) -> AlertLevel {
        if percent >= critical {
            return AlertLevel::Critical;
        }

        if percent >= warning {
            return AlertLevel::Warning;
        }

        AlertLevel::None
    }

    pub fn is_alerting(&self) -> bool {
        *self != AlertLevel::None
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::None => "none",
            AlertLevel::Warning => "warning",
            AlertLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert levels of one entity for the current tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAlertState {
    pub entity_id: String,
    pub cpu_level: AlertLevel,
    pub memory_level: AlertLevel,
}

pub fn classify(
    entity: &Entity,
    snapshot: Option<&EntitySnapshot>,
    thresholds: &AlertThresholds,
) -> EntityAlertState {
    let cpu_percent = value_or_zero(snapshot.and_then(|s| s.cpu_usage_percent));
    let memory_percent = snapshot.map(EntitySnapshot::memory_used_percent).unwrap_or_default();

    let cpu_level = AlertLevel::evaluate(cpu_percent, thresholds.cpu_warning, thresholds.cpu_critical);
    let memory_level = AlertLevel::evaluate(
        memory_percent,
        thresholds.memory_warning,
        thresholds.memory_critical,
    );

    trace!(
        "{}: cpu {cpu_percent:.1}% → {cpu_level}, memory {memory_percent:.1}% → {memory_level}",
        entity.id
    );

    EntityAlertState {
        entity_id: entity.id.clone(),
        cpu_level,
        memory_level,
    }
}

/// Number of entities per alert bucket
///
/// Each entity lands in at most one bucket per metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertCounts {
    pub cpu_warning_count: usize,
    pub cpu_critical_count: usize,
    pub mem_warning_count: usize,
    pub mem_critical_count: usize,
}

impl AlertCounts {
    pub fn tally<'a>(states: impl IntoIterator<Item = &'a EntityAlertState>) -> Self {
        let mut counts = AlertCounts::default();

        for state in states {
            match state.cpu_level {
                AlertLevel::Critical => counts.cpu_critical_count += 1,
                AlertLevel::Warning => counts.cpu_warning_count += 1,
                AlertLevel::None => {}
            }

            match state.memory_level {
                AlertLevel::Critical => counts.mem_critical_count += 1,
                AlertLevel::Warning => counts.mem_warning_count += 1,
                AlertLevel::None => {}
            }
        }

        counts
    }
}
