//! Monitor runtime - coordinates the feed, the detection core and the
//! delivery/export/persistence collaborators, one cycle per tick.

use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use opentelemetry::KeyValue;
use parking_lot::Mutex;
use tokio::time::interval;
use tracing::{debug, error, info, instrument, warn};

use havvakt_alerting::EmailNotifier;
use havvakt_config::HavvaktConfig;
use havvakt_core::{AlertEvent, Evaluator, GeofencePolygon, PositionFix};
use havvakt_export::{build_trails_collection, build_vessels_collection, GeoJsonExporter};
use havvakt_feed::AisClient;
use havvakt_storage::TrailDb;
use havvakt_telemetry::{EventLogger, MetricsRecorder};

use crate::error::EngineError;
use crate::traits::{AlertSink, EmailSink, FixSource, LogSink};

/// Outcome of one cycle, for operator-facing summaries.
#[derive(Debug, Default, Clone, Copy)]
pub struct CycleSummary {
    pub fixes_seen: usize,
    pub fixes_dropped: usize,
    pub alerts: usize,
    pub tracked_vessels: usize,
}

/// Owns the evaluator and the collaborator seams.
///
/// State is touched by one cycle at a time: `run_forever` awaits each
/// cycle to completion before the next tick, and the evaluator lock is
/// never held across an await point.
pub struct MonitorRuntime {
    config: HavvaktConfig,
    evaluator: Mutex<Evaluator>,
    source: tokio::sync::Mutex<Box<dyn FixSource>>,
    sink: Box<dyn AlertSink>,
    exporter: Option<GeoJsonExporter>,
    store: Option<Mutex<TrailDb>>,
    geofence_raw: Option<String>,
    metrics: Arc<MetricsRecorder>,
}

impl MonitorRuntime {
    /// Builds the production runtime: loads the geofence (fatal if
    /// invalid), restores persisted state, and wires the real feed client
    /// and alert sink.
    pub fn new(config: HavvaktConfig, metrics: Arc<MetricsRecorder>) -> Result<Self, EngineError> {
        let raw = fs::read_to_string(&config.monitor.geofence_path)?;
        let geofence = GeofencePolygon::from_geojson(&raw)?;
        info!(
            name = geofence.name().unwrap_or("unnamed"),
            path = %config.monitor.geofence_path.display(),
            "loaded geofence"
        );

        let source: Box<dyn FixSource> = Box::new(AisClient::new(config.feed.clone())?);
        let sink: Box<dyn AlertSink> = match EmailNotifier::from_config(&config.alerts)? {
            Some(notifier) => Box::new(EmailSink(notifier)),
            None => Box::new(LogSink),
        };

        let mut runtime = Self::from_parts(config, metrics, geofence, source, sink)?;
        runtime.geofence_raw = Some(raw);
        Ok(runtime)
    }

    /// Assembles a runtime from explicit parts. Production goes through
    /// [`MonitorRuntime::new`]; tests inject stub sources and sinks here.
    pub fn from_parts(
        config: HavvaktConfig,
        metrics: Arc<MetricsRecorder>,
        geofence: GeofencePolygon,
        source: Box<dyn FixSource>,
        sink: Box<dyn AlertSink>,
    ) -> Result<Self, EngineError> {
        let window = chrono::Duration::hours(config.monitor.trail_window_hours);
        let mut evaluator = Evaluator::new(geofence, window);

        let store = if config.storage.enabled {
            let db = TrailDb::open(&config.storage.db_path)?;
            let cutoff = Utc::now() - window;
            let fixes = db.load_positions(cutoff)?;
            let states = db.load_states()?;
            if !fixes.is_empty() || !states.is_empty() {
                info!(
                    fixes = fixes.len(),
                    vessels = states.len(),
                    "restored persisted monitor state"
                );
            }
            evaluator.restore(fixes, states);
            Some(Mutex::new(db))
        } else {
            None
        };

        let exporter = config
            .export
            .enabled
            .then(|| GeoJsonExporter::new(config.export.dir.clone()));

        Ok(Self {
            config,
            evaluator: Mutex::new(evaluator),
            source: tokio::sync::Mutex::new(source),
            sink,
            exporter,
            store,
            geofence_raw: None,
            metrics,
        })
    }

    /// Runs a single evaluation cycle to completion.
    ///
    /// Shell failures (feed, storage, export, delivery) are logged and the
    /// cycle carries on; only the core's own state transitions decide what
    /// alerts exist.
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> CycleSummary {
        let started = Instant::now();

        let (batch, metadata) = {
            let mut source = self.source.lock().await;
            let batch = match source.fetch_batch().await {
                Ok(batch) => batch,
                Err(err) => {
                    warn!(%err, "feed fetch failed, running cycle with empty batch");
                    Vec::new()
                }
            };
            (batch, source.metadata_snapshot())
        };

        let now = Utc::now();
        let (report, summary, vessels_doc, trails_doc, states) = {
            let mut evaluator = self.evaluator.lock();
            let report = evaluator.run_cycle(&batch, now);
            let summary = CycleSummary {
                fixes_seen: report.fixes_seen,
                fixes_dropped: report.fixes_dropped,
                alerts: report.alerts.len(),
                tracked_vessels: evaluator.trails().vessel_count(),
            };

            let docs = self.exporter.as_ref().map(|_| {
                let latest: Vec<_> = evaluator.trails().latest_fixes().cloned().collect();
                (
                    build_vessels_collection(&latest, &metadata),
                    build_trails_collection(evaluator.trails()),
                )
            });
            let states = evaluator.breach_states().clone();
            let (vessels_doc, trails_doc) = match docs {
                Some((v, t)) => (Some(v), Some(t)),
                None => (None, None),
            };
            (report, summary, vessels_doc, trails_doc, states)
        };

        self.metrics.observe_cycle(
            started.elapsed().as_secs_f64(),
            summary.alerts,
            summary.fixes_dropped,
        );

        if let Some(store) = &self.store {
            // Persist only what the core accepted; dropped fixes must not
            // round-trip into a trail through a later restore.
            let accepted: Vec<PositionFix> = batch
                .iter()
                .filter(|fix| fix.validate().is_ok())
                .cloned()
                .collect();
            let window = chrono::Duration::hours(self.config.monitor.trail_window_hours);
            let mut db = store.lock();
            let result = db
                .save_positions(&accepted)
                .and_then(|()| db.save_states(states.iter()))
                .and_then(|()| db.prune_before(now - window).map(|_| ()));
            if let Err(err) = result {
                error!(%err, "state persistence failed");
            }
        }

        if let (Some(exporter), Some(vessels), Some(trails)) =
            (&self.exporter, &vessels_doc, &trails_doc)
        {
            if let Err(err) = exporter.export_cycle(vessels, trails, self.geofence_raw.as_deref()) {
                error!(%err, "GeoJSON export failed");
            }
        }

        for alert in &report.alerts {
            self.dispatch_alert(alert.clone()).await;
        }

        debug!(
            fixes = summary.fixes_seen,
            dropped = summary.fixes_dropped,
            alerts = summary.alerts,
            vessels = summary.tracked_vessels,
            "cycle complete"
        );
        summary
    }

    /// Delivers one alert through the sink, with a structured audit event.
    /// Delivery failure never rolls back the state transition; the episode
    /// stays deduplicated.
    async fn dispatch_alert(&self, alert: AlertEvent) {
        let info = {
            let source = self.source.lock().await;
            source.vessel_info(alert.vessel_id)
        };

        EventLogger::log_event(
            "geofence_breach",
            vec![
                KeyValue::new("mmsi", alert.vessel_id.to_string()),
                KeyValue::new("lat", alert.position.lat.to_string()),
                KeyValue::new("lon", alert.position.lon.to_string()),
                KeyValue::new("entered_at", alert.entered_at.to_rfc3339()),
            ],
        )
        .await;

        if let Err(err) = self.sink.deliver(alert, info).await {
            error!(%err, "alert delivery failed");
        }
    }

    /// Continuous monitoring: one cycle per configured interval, first
    /// cycle immediately. Runs until the task is cancelled.
    pub async fn run_forever(&self) {
        let period = Duration::from_secs(self.config.monitor.check_interval_secs);
        info!(
            interval_secs = self.config.monitor.check_interval_secs,
            "starting continuous monitoring"
        );
        let mut ticker = interval(period);
        loop {
            ticker.tick().await;
            let summary = self.run_once().await;
            if summary.alerts == 0 {
                debug!("no breaches detected");
            }
        }
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }
}
