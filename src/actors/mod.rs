//! Actor-based polling
//!
//! The engine runs as a single poller actor owning the tick loop. Callers
//! talk to it through an [`poller::EngineHandle`]:
//!
//! ```text
//!   EngineHandle ── commands (mpsc) ──▶ PollerActor ──▶ EntitySnapshotSource
//!        │        ── enabled (watch) ──▶     │
//!        │                                   ├──▶ EngineView (history, ranking, counts)
//!        └──── subscribe (broadcast) ◀───────┘   TickEvent per completed tick
//! ```
//!
//! ## Communication Patterns
//!
//! 1. **Commands**: mpsc channel for control messages
//! 2. **Events**: broadcast channel for fan-out of completed ticks
//! 3. **Request/Response**: oneshot channels for PollNow

pub mod messages;
pub mod poller;

pub use messages::{PollerCommand, TickEvent};
pub use poller::EngineHandle;
