//! HTTP client for the AIS feed.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use havvakt_config::FeedConfig;
use havvakt_core::{PositionFix, VesselId, VesselInfo};

use crate::error::FeedError;
use crate::parse::{parse_locations, parse_metadata};

/// AIS feed client with a lazily refreshed vessel metadata cache.
pub struct AisClient {
    http: reqwest::Client,
    config: FeedConfig,
    metadata: HashMap<VesselId, VesselInfo>,
}

impl AisClient {
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            config,
            metadata: HashMap::new(),
        })
    }

    /// Fetches the current position batch, bbox-filtered.
    ///
    /// Refreshes the metadata cache first when it is empty; a metadata
    /// failure degrades to MMSI-only display names rather than failing the
    /// cycle.
    pub async fn fetch_batch(&mut self) -> Result<Vec<PositionFix>, FeedError> {
        if self.metadata.is_empty() {
            if let Err(err) = self.refresh_metadata().await {
                warn!(%err, "vessel metadata refresh failed, continuing without names");
            }
        }

        let body = self
            .http
            .get(&self.config.locations_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let fixes = parse_locations(&body, &self.config.bbox, Utc::now())?;
        info!(count = fixes.len(), "fetched position batch");
        Ok(fixes)
    }

    /// Reloads the vessel metadata cache from the vessels endpoint.
    pub async fn refresh_metadata(&mut self) -> Result<(), FeedError> {
        let body = self
            .http
            .get(&self.config.metadata_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let infos = parse_metadata(&body)?;
        info!(count = infos.len(), "loaded vessel metadata");
        self.metadata = infos.into_iter().map(|info| (info.mmsi, info)).collect();
        Ok(())
    }

    pub fn vessel_info(&self, id: VesselId) -> Option<&VesselInfo> {
        self.metadata.get(&id)
    }

    pub fn metadata(&self) -> &HashMap<VesselId, VesselInfo> {
        &self.metadata
    }
}
