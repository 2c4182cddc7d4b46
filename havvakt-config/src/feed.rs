//! AIS feed configuration.
//!
//! Endpoints for position and vessel-metadata queries plus the bounding
//! box that pre-filters fixes to the area of interest.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// AIS feed configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct FeedConfig {
    /// Position feed endpoint (GeoJSON FeatureCollection of point fixes).
    #[validate(url)]
    #[serde(default = "default_locations_url")]
    pub locations_url: String,

    /// Vessel metadata endpoint (names, ship types, call signs).
    #[validate(url)]
    #[serde(default = "default_metadata_url")]
    pub metadata_url: String,

    /// Request timeout in seconds.
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Area-of-interest pre-filter; fixes outside are ignored.
    #[validate(nested)]
    #[serde(default)]
    pub bbox: BboxConfig,
}

fn default_locations_url() -> String {
    "https://meri.digitraffic.fi/api/ais/v1/locations".into()
}

fn default_metadata_url() -> String {
    "https://meri.digitraffic.fi/api/ais/v1/vessels".into()
}

fn default_timeout() -> u64 {
    30
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            locations_url: default_locations_url(),
            metadata_url: default_metadata_url(),
            timeout_secs: default_timeout(),
            bbox: BboxConfig::default(),
        }
    }
}

/// Geographic bounding box. Defaults cover the Gulf of Finland.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[validate(schema(function = validation::validate_bbox))]
pub struct BboxConfig {
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default = "default_lat_min")]
    pub lat_min: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default = "default_lat_max")]
    pub lat_max: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default = "default_lon_min")]
    pub lon_min: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default = "default_lon_max")]
    pub lon_max: f64,
}

fn default_lat_min() -> f64 {
    59.0
}
fn default_lat_max() -> f64 {
    60.5
}
fn default_lon_min() -> f64 {
    24.0
}
fn default_lon_max() -> f64 {
    27.0
}

impl Default for BboxConfig {
    fn default() -> Self {
        Self {
            lat_min: default_lat_min(),
            lat_max: default_lat_max(),
            lon_min: default_lon_min(),
            lon_max: default_lon_max(),
        }
    }
}

impl BboxConfig {
    /// True when the coordinate lies inside the box, edges included.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lon_min..=self.lon_max).contains(&lon)
    }
}
