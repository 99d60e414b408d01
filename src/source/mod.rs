//! Snapshot sources
//!
//! The engine never talks to a hypervisor directly. It consumes a
//! [`EntitySnapshotSource`], which answers two questions: which entities are
//! running, and what does one entity look like right now.
//!
//! ## Sources
//!
//! - **HttpSource**: management API reachable over HTTP
//! - **MemorySource**: in-process, fed by the host (and by tests)

pub mod http;
pub mod memory;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, stream};
use tracing::{debug, instrument, warn};

use crate::{Entity, EntitySnapshot, SnapshotSlot, error::EngineResult};

pub use http::HttpSource;
pub use memory::MemorySource;

#[async_trait]
pub trait EntitySnapshotSource: Send + Sync {
    /// Entities that are currently running
    async fn list_running_entities(&self) -> EngineResult<Vec<Entity>>;

    /// Current reading for one entity; `Ok(None)` when the source has no data
    async fn get_entity_snapshot(&self, entity_id: &str) -> EngineResult<Option<EntitySnapshot>>;
}

/// Fetch snapshots for all entities with bounded parallelism.
///
/// Fetches complete in any order; the result is keyed by entity id and holds
/// one slot per entity. An error or a timeout turns into an absent slot for
/// that entity only.
#[instrument(skip_all, fields(entities = entities.len()))]
pub async fn fetch_snapshots(
    source: Arc<dyn EntitySnapshotSource>,
    entities: &[Entity],
    max_concurrent: usize,
    fetch_timeout: Duration,
) -> HashMap<String, SnapshotSlot> {
    // collected eagerly so the poller future stays Send
    let fetches: Vec<_> = entities
        .iter()
        .map(|entity| (source.clone(), entity.id.clone()))
        .map(|(source, entity_id)| async move {
            let slot = match tokio::time::timeout(fetch_timeout, source.get_entity_snapshot(&entity_id)).await {
                Ok(Ok(slot)) => slot,
                Ok(Err(e)) => {
                    warn!("{entity_id}: snapshot fetch failed: {e}");
                    None
                }
                Err(_) => {
                    warn!("{entity_id}: snapshot fetch timed out after {fetch_timeout:?}");
                    None
                }
            };
            (entity_id, slot)
        })
        .collect();

    let snapshots: HashMap<String, SnapshotSlot> = stream::iter(fetches)
        .buffer_unordered(max_concurrent.max(1))
        .collect()
        .await;

    debug!(
        "fetched {}/{} snapshots",
        snapshots.values().filter(|slot| slot.is_some()).count(),
        entities.len()
    );

    snapshots
}
