//! HTTP snapshot source
//!
//! Talks to the entity-management API of the surrounding system:
//!
//! ```text
//! GET {url}/entities                 → [Entity]
//! GET {url}/entities/{id}/snapshot   → EntitySnapshot (404 = no reading)
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::{instrument, trace};

use crate::{
    Entity, EntitySnapshot,
    config::SourceConfig,
    error::{EngineError, EngineResult},
};

use super::EntitySnapshotSource;

const SECRET_HEADER: &str = "X-MONITORING-SECRET";

pub struct HttpSource {
    base_url: Url,
    token: Option<String>,
    /// HTTP client (reused across requests)
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSource")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl HttpSource {
    pub fn new(config: &SourceConfig) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        let base_url = Url::parse(&config.url).map_err(|e| {
            EngineError::SourceUnavailable(format!("invalid source url {}: {e}", config.url))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(EngineError::SourceUnavailable(format!(
                "source url {} cannot carry a path",
                config.url
            )));
        }

        Ok(Self {
            base_url,
            token: config.token.clone(),
            client,
        })
    }

    /// Base URL extended by `segments`, each one percent-encoded as a single
    /// path segment
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.token {
            Some(token) => request.header(SECRET_HEADER, token),
            None => request,
        }
    }
}

#[async_trait]
impl EntitySnapshotSource for HttpSource {
    #[instrument(skip(self))]
    async fn list_running_entities(&self) -> EngineResult<Vec<Entity>> {
        let url = self.endpoint(&["entities"]);
        trace!("requesting entity list from {url}");

        let response = self.get(url).send().await?;

        if !response.status().is_success() {
            return Err(EngineError::SourceUnavailable(format!(
                "entity list returned HTTP {}",
                response.status()
            )));
        }

        let entities: Vec<Entity> = response.json().await?;
        trace!("received {} running entities", entities.len());

        Ok(entities)
    }

    #[instrument(skip(self))]
    async fn get_entity_snapshot(&self, entity_id: &str) -> EngineResult<Option<EntitySnapshot>> {
        let url = self.endpoint(&["entities", entity_id, "snapshot"]);

        let response = self.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            trace!("{entity_id}: source has no snapshot");
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(EngineError::SourceUnavailable(format!(
                "snapshot for {entity_id} returned HTTP {}",
                response.status()
            )));
        }

        let snapshot: EntitySnapshot = response.json().await?;
        Ok(Some(snapshot))
    }
}
