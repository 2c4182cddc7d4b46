//! Custom validation functions for configuration.

use validator::ValidationError;

use crate::feed::BboxConfig;

/// Validate that the bounding box is non-inverted on both axes.
pub fn validate_bbox(bbox: &BboxConfig) -> Result<(), ValidationError> {
    if bbox.lat_min >= bbox.lat_max {
        return Err(ValidationError::new("bbox_lat_inverted"));
    }
    if bbox.lon_min >= bbox.lon_max {
        return Err(ValidationError::new("bbox_lon_inverted"));
    }
    Ok(())
}
