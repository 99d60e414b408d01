//! Display ordering of entities
//!
//! Entities alerting on more metrics come first; within the same score the
//! busier CPU wins. The sort is stable, so rows with identical keys keep the
//! order the source listed them in and do not jump around between refreshes.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{Entity, EntitySnapshot, util::value_or_zero};

use super::classifier::{AlertLevel, EntityAlertState};

/// One row of the operator view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntity {
    pub entity: Entity,
    pub snapshot: Option<EntitySnapshot>,
    pub cpu_level: AlertLevel,
    pub memory_level: AlertLevel,
}

impl RankedEntity {
    pub fn new(entity: Entity, snapshot: Option<EntitySnapshot>, state: &EntityAlertState) -> Self {
        Self {
            entity,
            snapshot,
            cpu_level: state.cpu_level,
            memory_level: state.memory_level,
        }
    }

    /// Number of metrics currently at warning or above
    pub fn alert_score(&self) -> u8 {
        u8::from(self.cpu_level.is_alerting()) + u8::from(self.memory_level.is_alerting())
    }

    /// Raw CPU usage, absent readings count as 0
    pub fn cpu_usage(&self) -> f64 {
        value_or_zero(self.snapshot.as_ref().and_then(|s| s.cpu_usage_percent))
    }
}

fn priority(a: &RankedEntity, b: &RankedEntity) -> Ordering {
    b.alert_score()
        .cmp(&a.alert_score())
        .then_with(|| b.cpu_usage().total_cmp(&a.cpu_usage()))
}

/// Sort rows in place, most concerning first
pub fn rank(rows: &mut [RankedEntity]) {
    // slice::sort_by is stable
    rows.sort_by(priority);
}
