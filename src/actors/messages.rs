//! Message types for actor communication
//!
//! 1. **Commands**: sent to the poller via mpsc, optionally answered via oneshot
//! 2. **Events**: published on a broadcast channel once per completed tick

use tokio::sync::oneshot;

use crate::{aggregation::AggregatePoint, error::EngineResult, monitors::AlertCounts};

/// Event published after every completed tick
///
/// Slow subscribers may lag and miss events; the view always holds the
/// latest state, so gaps here are harmless.
#[derive(Debug, Clone)]
pub struct TickEvent {
    pub point: AggregatePoint,
    pub counts: AlertCounts,
}

/// Commands that can be sent to the PollerActor
#[derive(Debug)]
pub enum PollerCommand {
    /// Refresh the entity list and run one tick right away
    ///
    /// Runs even while auto-refresh is disabled.
    PollNow {
        respond_to: oneshot::Sender<EngineResult<AggregatePoint>>,
    },

    /// Change one or both polling cadences
    UpdateIntervals {
        entity_interval_secs: Option<u64>,
        snapshot_interval_secs: Option<u64>,
    },

    /// Stop the poller
    Shutdown,
}
