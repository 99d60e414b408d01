//! Operator-editable alert thresholds
//!
//! The store is the only shared mutable state in the engine: the poller reads
//! it every tick, the operator replaces it through the API. The whole struct
//! is swapped under one write lock, so a reader never sees half an update.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};

/// Warning/critical percentage pairs for CPU and memory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub cpu_warning: f64,
    pub cpu_critical: f64,
    pub memory_warning: f64,
    pub memory_critical: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            cpu_warning: 70.0,
            cpu_critical: 90.0,
            memory_warning: 80.0,
            memory_critical: 95.0,
        }
    }
}

impl AlertThresholds {
    /// Check that every value is a percentage and `warning <= critical`
    pub fn validate(&self) -> EngineResult<()> {
        let fields = [
            ("cpu_warning", self.cpu_warning),
            ("cpu_critical", self.cpu_critical),
            ("memory_warning", self.memory_warning),
            ("memory_critical", self.memory_critical),
        ];

        for (name, value) in fields {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(EngineError::InvalidThresholds(format!(
                    "{name} must be within 0..=100, got {value}"
                )));
            }
        }

        if self.cpu_warning > self.cpu_critical {
            return Err(EngineError::InvalidThresholds(format!(
                "cpu warning {} exceeds cpu critical {}",
                self.cpu_warning, self.cpu_critical
            )));
        }

        if self.memory_warning > self.memory_critical {
            return Err(EngineError::InvalidThresholds(format!(
                "memory warning {} exceeds memory critical {}",
                self.memory_warning, self.memory_critical
            )));
        }

        Ok(())
    }
}

/// Shared, cloneable holder of the current thresholds
#[derive(Debug, Clone, Default)]
pub struct ThresholdStore {
    current: Arc<RwLock<AlertThresholds>>,
}

impl ThresholdStore {
    /// Create a store with validated initial thresholds
    pub fn new(initial: AlertThresholds) -> EngineResult<Self> {
        initial.validate()?;
        Ok(Self {
            current: Arc::new(RwLock::new(initial)),
        })
    }

    pub async fn get(&self) -> AlertThresholds {
        *self.current.read().await
    }

    /// Replace the thresholds; on rejection the previous value stays active
    pub async fn set(&self, thresholds: AlertThresholds) -> EngineResult<()> {
        if let Err(e) = thresholds.validate() {
            warn!("rejected threshold update: {e}");
            return Err(e);
        }

        *self.current.write().await = thresholds;
        debug!("thresholds updated: {thresholds:?}");
        Ok(())
    }
}
