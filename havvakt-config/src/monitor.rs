//! Monitoring cadence and geofence configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Cycle scheduling, geofence source and trail window.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct MonitorConfig {
    /// GeoJSON file holding the restricted-area polygon.
    #[serde(default = "default_geofence_path")]
    pub geofence_path: PathBuf,

    /// Seconds between evaluation cycles.
    #[validate(range(min = 10, max = 86400))]
    #[serde(default = "default_interval")]
    pub check_interval_secs: u64,

    /// Rolling trail window in hours.
    #[validate(range(min = 1, max = 168))]
    #[serde(default = "default_trail_window")]
    pub trail_window_hours: i64,
}

fn default_geofence_path() -> PathBuf {
    "config/restricted.geojson".into()
}

fn default_interval() -> u64 {
    300
}

fn default_trail_window() -> i64 {
    3
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            geofence_path: default_geofence_path(),
            check_interval_secs: default_interval(),
            trail_window_hours: default_trail_window(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_monitor_config_is_valid() {
        MonitorConfig::default()
            .validate()
            .expect("Default config should be valid");
    }

    #[test]
    fn too_short_interval_is_rejected() {
        let mut config = MonitorConfig::default();
        config.check_interval_secs = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_window_is_rejected() {
        let mut config = MonitorConfig::default();
        config.trail_window_hours = 0;
        assert!(config.validate().is_err());
    }
}
