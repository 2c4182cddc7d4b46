//! Collaborator seams for the runtime.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::warn;

use havvakt_core::{AlertEvent, PositionFix, VesselId, VesselInfo};
use havvakt_feed::AisClient;

use crate::error::EngineError;

/// Supplies one batch of position fixes per cycle.
#[async_trait]
pub trait FixSource: Send {
    async fn fetch_batch(&mut self) -> Result<Vec<PositionFix>, EngineError>;

    /// Static metadata for a vessel, if the source knows it.
    fn vessel_info(&self, id: VesselId) -> Option<VesselInfo>;

    /// Snapshot of the full metadata cache, for export labeling.
    fn metadata_snapshot(&self) -> HashMap<VesselId, VesselInfo> {
        HashMap::new()
    }
}

#[async_trait]
impl FixSource for AisClient {
    async fn fetch_batch(&mut self) -> Result<Vec<PositionFix>, EngineError> {
        Ok(AisClient::fetch_batch(self).await?)
    }

    fn vessel_info(&self, id: VesselId) -> Option<VesselInfo> {
        AisClient::vessel_info(self, id).cloned()
    }

    fn metadata_snapshot(&self) -> HashMap<VesselId, VesselInfo> {
        self.metadata().clone()
    }
}

/// Receives alert events for delivery. The runtime guarantees at most one
/// event per intrusion episode; sinks only format and forward.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, event: AlertEvent, info: Option<VesselInfo>)
        -> Result<(), EngineError>;
}

/// Logging-only sink, used when email delivery is disabled and in tests.
pub struct LogSink;

#[async_trait]
impl AlertSink for LogSink {
    async fn deliver(
        &self,
        event: AlertEvent,
        info: Option<VesselInfo>,
    ) -> Result<(), EngineError> {
        let name = info
            .map(|i| i.display_name())
            .unwrap_or_else(|| format!("MMSI-{}", event.vessel_id));
        warn!(
            vessel = %name,
            mmsi = %event.vessel_id,
            lat = event.position.lat,
            lon = event.position.lon,
            entered_at = %event.entered_at,
            "BREACH: vessel in restricted area"
        );
        Ok(())
    }
}

/// Email delivery through a blocking SMTP transport.
pub struct EmailSink(pub havvakt_alerting::EmailNotifier);

#[async_trait]
impl AlertSink for EmailSink {
    async fn deliver(
        &self,
        event: AlertEvent,
        info: Option<VesselInfo>,
    ) -> Result<(), EngineError> {
        let notifier = self.0.clone();
        tokio::task::spawn_blocking(move || notifier.send(&event, info.as_ref())).await??;
        Ok(())
    }
}
