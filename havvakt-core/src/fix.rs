//! Position fix and vessel identity types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by structural sanity checks on a single fix.
///
/// These are recoverable: the offending fix is dropped and the cycle
/// continues for unrelated vessels.
#[derive(Debug, Error, PartialEq)]
pub enum FixError {
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// Vessel identity: the 9-digit MMSI carried in every AIS message.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VesselId(pub u32);

impl fmt::Display for VesselId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One timestamped vessel position report.
///
/// Immutable once created; speed and course are optional because not every
/// AIS transponder reports them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub vessel_id: VesselId,
    pub lat: f64,
    pub lon: f64,
    pub timestamp: DateTime<Utc>,
    /// Speed over ground in knots.
    #[serde(default)]
    pub sog: Option<f64>,
    /// Course over ground in degrees.
    #[serde(default)]
    pub cog: Option<f64>,
}

impl PositionFix {
    /// Structural sanity check. NaN coordinates fail the range tests.
    pub fn validate(&self) -> Result<(), FixError> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(FixError::LatitudeOutOfRange(self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(FixError::LongitudeOutOfRange(self.lon));
        }
        Ok(())
    }
}

/// Static vessel metadata from the feed's vessel endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VesselInfo {
    pub mmsi: VesselId,
    pub name: String,
    #[serde(default)]
    pub ship_type: u32,
    #[serde(default)]
    pub call_sign: String,
    #[serde(default)]
    pub destination: String,
}

impl VesselInfo {
    /// Display name, falling back to the MMSI when the feed has no name.
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            format!("MMSI-{}", self.mmsi)
        } else {
            self.name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fix(lat: f64, lon: f64) -> PositionFix {
        PositionFix {
            vessel_id: VesselId(230_123_456),
            lat,
            lon,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            sog: Some(12.3),
            cog: Some(270.0),
        }
    }

    #[test]
    fn valid_fix_passes() {
        assert_eq!(fix(59.5, 24.8).validate(), Ok(()));
    }

    #[test]
    fn poles_and_antimeridian_are_valid() {
        assert_eq!(fix(90.0, 180.0).validate(), Ok(()));
        assert_eq!(fix(-90.0, -180.0).validate(), Ok(()));
    }

    #[test]
    fn out_of_range_latitude_rejected() {
        assert_eq!(
            fix(91.0, 0.0).validate(),
            Err(FixError::LatitudeOutOfRange(91.0))
        );
    }

    #[test]
    fn out_of_range_longitude_rejected() {
        assert_eq!(
            fix(0.0, -180.5).validate(),
            Err(FixError::LongitudeOutOfRange(-180.5))
        );
    }

    #[test]
    fn nan_coordinates_rejected() {
        assert!(fix(f64::NAN, 0.0).validate().is_err());
        assert!(fix(0.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn display_name_falls_back_to_mmsi() {
        let info = VesselInfo {
            mmsi: VesselId(123),
            name: "  ".into(),
            ..VesselInfo::default()
        };
        assert_eq!(info.display_name(), "MMSI-123");
    }
}
