//! GeoJSON snapshot writer.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};

use havvakt_core::{PositionFix, TrailStore, VesselId, VesselInfo};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Builds a FeatureCollection of the latest position per vessel.
pub fn build_vessels_collection(
    fixes: &[PositionFix],
    metadata: &HashMap<VesselId, VesselInfo>,
) -> Value {
    let features: Vec<Value> = fixes
        .iter()
        .map(|fix| {
            let name = metadata
                .get(&fix.vessel_id)
                .map(VesselInfo::display_name)
                .unwrap_or_else(|| format!("MMSI-{}", fix.vessel_id));
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [fix.lon, fix.lat],
                },
                "properties": {
                    "mmsi": fix.vessel_id.0,
                    "name": name,
                    "sog": fix.sog,
                    "cog": fix.cog,
                    "timestamp": fix.timestamp.to_rfc3339(),
                },
            })
        })
        .collect();

    json!({"type": "FeatureCollection", "features": features})
}

/// Builds a FeatureCollection of LineString trails. Vessels with fewer
/// than two points have no line to draw and are omitted.
pub fn build_trails_collection(trails: &TrailStore) -> Value {
    let features: Vec<Value> = trails
        .iter()
        .filter(|(_, trail)| trail.len() >= 2)
        .map(|(id, trail)| {
            let coordinates: Vec<Value> = trail.iter().map(|fix| json!([fix.lon, fix.lat])).collect();
            json!({
                "type": "Feature",
                "geometry": {"type": "LineString", "coordinates": coordinates},
                "properties": {
                    "mmsi": id.0,
                    "points": trail.len(),
                    "start": trail.front().map(|f| f.timestamp.to_rfc3339()),
                    "end": trail.back().map(|f| f.timestamp.to_rfc3339()),
                },
            })
        })
        .collect();

    json!({"type": "FeatureCollection", "features": features})
}

/// Writes cycle snapshots into one output directory.
pub struct GeoJsonExporter {
    dir: PathBuf,
}

impl GeoJsonExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes one named document, creating the directory if missing.
    pub fn write(&self, filename: &str, document: &Value) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        fs::write(&path, serde_json::to_string_pretty(document)?)?;
        debug!(path = %path.display(), "wrote GeoJSON document");
        Ok(path)
    }

    /// Copies the raw restricted-area file alongside the snapshots so the
    /// map front end serves everything from one place.
    pub fn write_restricted(&self, raw: &str) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join("restricted.geojson");
        fs::write(&path, raw)?;
        Ok(path)
    }

    /// Full per-cycle export.
    pub fn export_cycle(
        &self,
        vessels: &Value,
        trails: &Value,
        restricted: Option<&str>,
    ) -> Result<(), ExportError> {
        self.write("vessels.geojson", vessels)?;
        self.write("trails.geojson", trails)?;
        if let Some(raw) = restricted {
            self.write_restricted(raw)?;
        }
        info!(dir = %self.dir.display(), "exported GeoJSON snapshots");
        Ok(())
    }
}
