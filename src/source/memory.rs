//! In-memory snapshot source
//!
//! The host pushes entities and readings into it; the engine polls it like
//! any other source. Failure switches make it possible to exercise the
//! degraded paths without a real hypervisor.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use crate::{
    Entity, EntitySnapshot,
    error::{EngineError, EngineResult},
};

use super::EntitySnapshotSource;

#[derive(Debug, Default)]
struct Inner {
    /// Running entities in listing order
    entities: Vec<Entity>,
    snapshots: HashMap<String, EntitySnapshot>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    list_unavailable: bool,
}

/// Shared, cloneable in-memory source
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    inner: Arc<RwLock<Inner>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entity (keeps its list position when replacing)
    pub async fn upsert(&self, entity: Entity, snapshot: Option<EntitySnapshot>) {
        let mut inner = self.inner.write().await;

        match snapshot {
            Some(snapshot) => {
                inner.snapshots.insert(entity.id.clone(), snapshot);
            }
            None => {
                inner.snapshots.remove(&entity.id);
            }
        }

        match inner.entities.iter_mut().find(|e| e.id == entity.id) {
            Some(existing) => *existing = entity,
            None => inner.entities.push(entity),
        }
    }

    pub async fn set_snapshot(&self, snapshot: EntitySnapshot) {
        let mut inner = self.inner.write().await;
        inner.snapshots.insert(snapshot.entity_id.clone(), snapshot);
    }

    /// Stop reporting an entity as running
    pub async fn remove(&self, entity_id: &str) {
        let mut inner = self.inner.write().await;
        inner.entities.retain(|e| e.id != entity_id);
        inner.snapshots.remove(entity_id);
        inner.failing.remove(entity_id);
        inner.delays.remove(entity_id);
    }

    pub async fn clear(&self) {
        *self.inner.write().await = Inner::default();
    }

    /// Make snapshot fetches for one entity fail
    pub async fn fail_entity(&self, entity_id: &str, failing: bool) {
        let mut inner = self.inner.write().await;
        if failing {
            inner.failing.insert(entity_id.to_string());
        } else {
            inner.failing.remove(entity_id);
        }
    }

    /// Make snapshot fetches for one entity take at least `delay`
    pub async fn set_delay(&self, entity_id: &str, delay: Duration) {
        let mut inner = self.inner.write().await;
        inner.delays.insert(entity_id.to_string(), delay);
    }

    /// Make listing fail
    pub async fn set_list_available(&self, available: bool) {
        self.inner.write().await.list_unavailable = !available;
    }
}

#[async_trait]
impl EntitySnapshotSource for MemorySource {
    async fn list_running_entities(&self) -> EngineResult<Vec<Entity>> {
        let inner = self.inner.read().await;

        if inner.list_unavailable {
            return Err(EngineError::SourceUnavailable(
                "entity list unavailable".to_string(),
            ));
        }

        Ok(inner.entities.clone())
    }

    async fn get_entity_snapshot(&self, entity_id: &str) -> EngineResult<Option<EntitySnapshot>> {
        let (delay, failing, snapshot) = {
            let inner = self.inner.read().await;
            (
                inner.delays.get(entity_id).copied(),
                inner.failing.contains(entity_id),
                inner.snapshots.get(entity_id).cloned(),
            )
        };

        if let Some(delay) = delay {
            trace!("{entity_id}: delaying snapshot by {delay:?}");
            tokio::time::sleep(delay).await;
        }

        if failing {
            return Err(EngineError::SourceUnavailable(format!(
                "snapshot for {entity_id} unavailable"
            )));
        }

        Ok(snapshot)
    }
}
