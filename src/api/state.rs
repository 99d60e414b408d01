//! API shared state

use crate::actors::EngineHandle;

/// Shared state passed to all API handlers
#[derive(Clone)]
pub struct ApiState {
    /// Handle to the poller for views, thresholds and the auto-refresh toggle
    pub engine: EngineHandle,
}

impl ApiState {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }
}
