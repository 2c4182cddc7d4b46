//! Tolerant parsing of the AIS feed payloads.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use havvakt_config::BboxConfig;
use havvakt_core::{PositionFix, VesselId, VesselInfo};

use crate::error::FeedError;

#[derive(Deserialize)]
struct LocationCollection {
    #[serde(default)]
    features: Vec<Value>,
}

#[derive(Deserialize)]
struct LocationFeature {
    geometry: PointGeometry,
    properties: LocationProperties,
}

#[derive(Deserialize)]
struct PointGeometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Vec<f64>,
}

#[derive(Deserialize)]
struct LocationProperties {
    mmsi: u32,
    #[serde(default)]
    sog: Option<f64>,
    #[serde(default)]
    cog: Option<f64>,
    /// Receiver timestamp, milliseconds since the epoch.
    #[serde(rename = "timestampExternal", default)]
    timestamp_external: Option<i64>,
}

/// Parses the locations FeatureCollection into position fixes.
///
/// Malformed features are skipped, non-point geometries are skipped, and
/// fixes outside the bounding box are discarded. Features without a
/// receiver timestamp get `now`.
pub fn parse_locations(
    body: &str,
    bbox: &BboxConfig,
    now: DateTime<Utc>,
) -> Result<Vec<PositionFix>, FeedError> {
    let collection: LocationCollection = serde_json::from_str(body)?;

    let mut fixes = Vec::new();
    for raw in collection.features {
        let feature: LocationFeature = match serde_json::from_value(raw) {
            Ok(feature) => feature,
            Err(err) => {
                trace!(%err, "skipping malformed location feature");
                continue;
            }
        };
        if feature.geometry.kind != "Point" || feature.geometry.coordinates.len() < 2 {
            continue;
        }

        // GeoJSON orders coordinates [lon, lat].
        let lon = feature.geometry.coordinates[0];
        let lat = feature.geometry.coordinates[1];
        if !bbox.contains(lat, lon) {
            continue;
        }

        let timestamp = feature
            .properties
            .timestamp_external
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or(now);

        fixes.push(PositionFix {
            vessel_id: VesselId(feature.properties.mmsi),
            lat,
            lon,
            timestamp,
            sog: feature.properties.sog,
            cog: feature.properties.cog,
        });
    }

    debug!(count = fixes.len(), "parsed location batch");
    Ok(fixes)
}

#[derive(Deserialize)]
struct MetadataRecord {
    mmsi: u32,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "shipType", default)]
    ship_type: u32,
    #[serde(rename = "callSign", default)]
    call_sign: Option<String>,
    #[serde(default)]
    destination: Option<String>,
}

/// Parses the vessels endpoint (a JSON array) into a metadata list.
pub fn parse_metadata(body: &str) -> Result<Vec<VesselInfo>, FeedError> {
    let records: Vec<Value> = serde_json::from_str(body)?;

    let infos = records
        .into_iter()
        .filter_map(|raw| serde_json::from_value::<MetadataRecord>(raw).ok())
        .map(|record| VesselInfo {
            mmsi: VesselId(record.mmsi),
            name: record.name.unwrap_or_default().trim().to_string(),
            ship_type: record.ship_type,
            call_sign: record.call_sign.unwrap_or_default(),
            destination: record.destination.unwrap_or_default(),
        })
        .collect();
    Ok(infos)
}
