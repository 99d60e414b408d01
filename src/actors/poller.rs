//! PollerActor - Drives the aggregation engine
//!
//! ## Two cadences
//!
//! ```text
//! entity tick (slow)   → list running entities → keep as current set
//! snapshot tick (fast) → fan-out fetch → aggregate + classify + rank → publish
//!     ↑
//!     └─── Commands (PollNow, UpdateIntervals, Shutdown) and the enabled flag
//! ```
//!
//! Tick work runs inline in the actor loop and both intervals skip missed
//! ticks, so a slow source drops ticks instead of queueing them. Points
//! therefore reach the history strictly in tick order.
//!
//! Turning auto-refresh off abandons an in-flight tick; nothing from it is
//! published. A failed entity-list refresh keeps the previous set and the
//! previously published view.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::{debug, info, instrument, trace, warn};

use crate::{
    Entity, SnapshotSlot,
    aggregation::{AggregatePoint, compute_tick_at},
    config::PollingConfig,
    error::{EngineError, EngineResult},
    monitors::{AlertCounts, RankedEntity, classify, rank},
    source::{EntitySnapshotSource, fetch_snapshots},
    thresholds::{AlertThresholds, ThresholdStore},
    view::{EngineView, PollingStatus},
};

use super::messages::{PollerCommand, TickEvent};

fn ticker(period: Duration) -> Interval {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

pub struct PollerActor {
    source: Arc<dyn EntitySnapshotSource>,

    thresholds: ThresholdStore,

    view: EngineView,

    config: PollingConfig,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<PollerCommand>,

    /// Auto-refresh toggle
    enabled_rx: watch::Receiver<bool>,

    /// Broadcast sender for completed ticks
    tick_tx: broadcast::Sender<TickEvent>,

    /// Running entities as of the last successful list refresh
    entities: Vec<Entity>,

    /// Whether the entity list has been loaded at least once
    entities_loaded: bool,
}

impl PollerActor {
    pub fn new(
        source: Arc<dyn EntitySnapshotSource>,
        thresholds: ThresholdStore,
        view: EngineView,
        config: PollingConfig,
        command_rx: mpsc::Receiver<PollerCommand>,
        enabled_rx: watch::Receiver<bool>,
        tick_tx: broadcast::Sender<TickEvent>,
    ) -> Self {
        Self {
            source,
            thresholds,
            view,
            config,
            command_rx,
            enabled_rx,
            tick_tx,
            entities: Vec::new(),
            entities_loaded: false,
        }
    }

    fn is_enabled(&self) -> bool {
        *self.enabled_rx.borrow()
    }

    /// Run the actor's main loop until shutdown or until all handles are gone
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        info!(
            entity_interval_secs = self.config.entity_interval_secs,
            snapshot_interval_secs = self.config.snapshot_interval_secs,
            "starting poller actor"
        );

        let mut entity_ticker = ticker(self.config.entity_interval());
        let mut snapshot_ticker = ticker(self.config.snapshot_interval());

        loop {
            tokio::select! {
                _ = entity_ticker.tick() => {
                    if self.is_enabled() {
                        if let Err(e) = self.refresh_entities().await {
                            warn!("skipping entity refresh: {e}");
                        }
                    }
                }

                _ = snapshot_ticker.tick() => {
                    if self.is_enabled() {
                        self.timed_tick().await;
                    }
                }

                changed = self.enabled_rx.changed() => {
                    if changed.is_err() {
                        debug!("enable flag dropped, shutting down");
                        break;
                    }

                    if self.is_enabled() {
                        info!("auto-refresh enabled");
                        // start the next tick from a fresh entity set
                        self.entities_loaded = false;
                    } else {
                        info!("auto-refresh disabled");
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        PollerCommand::PollNow { respond_to } => {
                            debug!("received PollNow command");
                            let result = self.poll_now().await;
                            let _ = respond_to.send(result);
                        }

                        PollerCommand::UpdateIntervals { entity_interval_secs, snapshot_interval_secs } => {
                            if let Some(secs) = entity_interval_secs {
                                debug!("updating entity interval to {secs}s");
                                self.config.entity_interval_secs = secs;
                                entity_ticker = ticker(self.config.entity_interval());
                            }
                            if let Some(secs) = snapshot_interval_secs {
                                debug!("updating snapshot interval to {secs}s");
                                self.config.snapshot_interval_secs = secs;
                                snapshot_ticker = ticker(self.config.snapshot_interval());
                            }
                        }

                        PollerCommand::Shutdown => {
                            debug!("received shutdown command");
                            break;
                        }
                    }
                }

                else => {
                    warn!("command channel closed, shutting down");
                    break;
                }
            }
        }

        debug!("poller actor stopped");
    }

    /// Replace the current entity set with the source's running set.
    ///
    /// On failure the previous set stays in place.
    #[instrument(skip(self))]
    async fn refresh_entities(&mut self) -> EngineResult<()> {
        match self.source.list_running_entities().await {
            Ok(entities) => {
                trace!("source reports {} running entities", entities.len());
                self.entities = dedup_entities(entities);
                self.entities_loaded = true;
                self.view.clear_error().await;
                Ok(())
            }
            Err(e) => {
                self.view.record_error(e.to_string()).await;
                Err(e)
            }
        }
    }

    /// Timer-driven tick; abandoned if auto-refresh is switched off meanwhile
    async fn timed_tick(&mut self) {
        if !self.entities_loaded {
            if let Err(e) = self.refresh_entities().await {
                warn!("skipping tick, no entity list yet: {e}");
                return;
            }
        }

        let mut enabled_rx = self.enabled_rx.clone();
        let snapshots = tokio::select! {
            snapshots = self.fetch_current() => snapshots,
            _ = enabled_rx.wait_for(|enabled| !*enabled) => {
                debug!("auto-refresh disabled mid-tick, abandoning tick");
                return;
            }
        };

        self.publish_tick(snapshots).await;
    }

    async fn poll_now(&mut self) -> EngineResult<AggregatePoint> {
        self.refresh_entities().await?;
        let snapshots = self.fetch_current().await;
        Ok(self.publish_tick(snapshots).await)
    }

    async fn fetch_current(&self) -> HashMap<String, SnapshotSlot> {
        if self.entities.is_empty() {
            return HashMap::new();
        }

        fetch_snapshots(
            self.source.clone(),
            &self.entities,
            self.config.max_concurrent_fetches,
            self.config.fetch_timeout(),
        )
        .await
    }

    /// Aggregate, classify and rank one tick, then publish it
    #[instrument(skip_all, fields(entities = self.entities.len()))]
    async fn publish_tick(&mut self, mut snapshots: HashMap<String, SnapshotSlot>) -> AggregatePoint {
        let thresholds = self.thresholds.get().await;
        let point = compute_tick_at(&self.entities, &snapshots, Utc::now());
        let (ranking, counts) = build_ranking(&self.entities, &mut snapshots, &thresholds);

        trace!(
            "tick: {}/{} sampled, avg cpu {:.1}%, memory {:.1}%",
            point.sampled_entity_count,
            point.running_entity_count,
            point.avg_cpu_percent,
            point.total_memory_used_percent
        );

        self.view.record_tick(point.clone(), ranking, counts).await;

        // No subscribers is fine
        let _ = self.tick_tx.send(TickEvent {
            point: point.clone(),
            counts,
        });

        point
    }
}

/// Keep the first entity for every id, preserving source order
fn dedup_entities(entities: Vec<Entity>) -> Vec<Entity> {
    let mut seen = HashSet::with_capacity(entities.len());
    let total = entities.len();

    let unique: Vec<Entity> = entities
        .into_iter()
        .filter(|entity| seen.insert(entity.id.clone()))
        .collect();

    if unique.len() != total {
        warn!("source listed {} duplicate entity ids", total - unique.len());
    }

    unique
}

/// Classify every entity and order the rows for display
///
/// Consumes the snapshots from `snapshots` into the rows.
pub fn build_ranking(
    entities: &[Entity],
    snapshots: &mut HashMap<String, SnapshotSlot>,
    thresholds: &AlertThresholds,
) -> (Vec<RankedEntity>, AlertCounts) {
    let mut states = Vec::with_capacity(entities.len());
    let mut rows = Vec::with_capacity(entities.len());

    for entity in entities {
        let snapshot = snapshots.remove(&entity.id).flatten();
        let state = classify(entity, snapshot.as_ref(), thresholds);
        rows.push(RankedEntity::new(entity.clone(), snapshot, &state));
        states.push(state);
    }

    rank(&mut rows);
    (rows, AlertCounts::tally(&states))
}

/// Handle for controlling the poller and reading the engine's view
///
/// Cheap to clone and shareable across tasks.
#[derive(Clone)]
pub struct EngineHandle {
    /// Command sender
    sender: mpsc::Sender<PollerCommand>,

    enabled_tx: Arc<watch::Sender<bool>>,

    thresholds: ThresholdStore,

    view: EngineView,

    tick_tx: broadcast::Sender<TickEvent>,
}

impl EngineHandle {
    /// Spawn a poller actor for `source` and return its handle
    pub fn spawn(
        source: Arc<dyn EntitySnapshotSource>,
        thresholds: ThresholdStore,
        config: PollingConfig,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let (enabled_tx, enabled_rx) = watch::channel(config.enabled);
        let (tick_tx, _) = broadcast::channel(64);
        let view = EngineView::new(config.history_capacity);

        let actor = PollerActor::new(
            source,
            thresholds.clone(),
            view.clone(),
            config,
            cmd_rx,
            enabled_rx,
            tick_tx.clone(),
        );

        tokio::spawn(actor.run());

        Self {
            sender: cmd_tx,
            enabled_tx: Arc::new(enabled_tx),
            thresholds,
            view,
            tick_tx,
        }
    }

    /// Aggregate points, oldest first
    pub async fn history(&self) -> Vec<AggregatePoint> {
        self.view.history().await
    }

    /// Entities ordered most concerning first
    pub async fn ranking(&self) -> Vec<RankedEntity> {
        self.view.ranking().await
    }

    pub async fn alert_counts(&self) -> AlertCounts {
        self.view.counts().await
    }

    pub async fn thresholds(&self) -> AlertThresholds {
        self.thresholds.get().await
    }

    /// Replace the thresholds; takes effect from the next tick
    pub async fn set_thresholds(&self, thresholds: AlertThresholds) -> EngineResult<()> {
        self.thresholds.set(thresholds).await
    }

    /// Toggle auto-refresh
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled_tx.send_replace(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        *self.enabled_tx.borrow()
    }

    pub async fn status(&self) -> PollingStatus {
        self.view.status().await
    }

    pub async fn resize_history(&self, capacity: usize) {
        self.view.resize_history(capacity).await;
    }

    /// Subscribe to completed ticks
    pub fn subscribe(&self) -> broadcast::Receiver<TickEvent> {
        self.tick_tx.subscribe()
    }

    /// Refresh the entity list and run one tick immediately
    pub async fn poll_now(&self) -> EngineResult<AggregatePoint> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(PollerCommand::PollNow { respond_to: tx })
            .await
            .map_err(|_| EngineError::ActorStopped)?;

        rx.await.map_err(|_| EngineError::ActorStopped)?
    }

    pub async fn update_intervals(
        &self,
        entity_interval_secs: Option<u64>,
        snapshot_interval_secs: Option<u64>,
    ) -> Result<()> {
        self.sender
            .send(PollerCommand::UpdateIntervals {
                entity_interval_secs,
                snapshot_interval_secs,
            })
            .await
            .context("failed to send UpdateIntervals command")?;
        Ok(())
    }

    /// Stop the poller
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(PollerCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }
}
