//! Restricted-area polygon and point-in-polygon membership test.
//!
//! The polygon is loaded once per run and read-only afterwards. Membership
//! is an even-odd ray cast with one deliberate twist: points exactly on a
//! ring are counted as inside, so a vessel sitting on the boundary line is
//! flagged rather than silently missed. Holes subtract membership.

use serde::Deserialize;
use thiserror::Error;

/// Tolerance for the point-on-segment boundary test, in degrees.
/// Roughly a tenth of a millimetre at the equator.
const BOUNDARY_EPS: f64 = 1e-9;

/// Minimum ring area in degrees squared. 1e-12 is well under a square
/// metre anywhere on Earth, so only collinear rings fall below it while a
/// legitimate zone tens of metres across stays far above.
const MIN_RING_AREA: f64 = 1e-12;

/// Fatal geometry errors. No restricted area means no safe operation, so
/// these abort startup rather than being handled at runtime.
#[derive(Debug, Error)]
pub enum GeofenceError {
    #[error("ring needs at least 3 distinct vertices, got {0}")]
    TooFewVertices(usize),

    #[error("ring has zero area")]
    DegenerateRing,

    #[error("GeoJSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("expected a FeatureCollection with at least one feature")]
    EmptyCollection,

    #[error("expected a Polygon geometry, got {0}")]
    NotAPolygon(String),
}

/// One closed ring of (lat, lon) vertices. Implicitly closed: the last
/// vertex connects back to the first.
type Ring = Vec<(f64, f64)>;

/// Immutable simple polygon, optionally with interior holes.
#[derive(Debug, Clone)]
pub struct GeofencePolygon {
    exterior: Ring,
    holes: Vec<Ring>,
    name: Option<String>,
}

impl GeofencePolygon {
    /// Builds a polygon from an exterior ring and zero or more hole rings.
    ///
    /// A trailing vertex equal to the first is dropped, then each ring must
    /// have at least 3 distinct vertices and non-zero area.
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Result<Self, GeofenceError> {
        let exterior = normalize_ring(exterior)?;
        let holes = holes
            .into_iter()
            .map(normalize_ring)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            exterior,
            holes,
            name: None,
        })
    }

    /// Parses the first feature of a GeoJSON FeatureCollection as the
    /// restricted area. GeoJSON orders coordinates [lon, lat].
    pub fn from_geojson(raw: &str) -> Result<Self, GeofenceError> {
        let collection: FeatureCollection = serde_json::from_str(raw)?;
        let feature = collection
            .features
            .into_iter()
            .next()
            .ok_or(GeofenceError::EmptyCollection)?;
        if feature.geometry.kind != "Polygon" {
            return Err(GeofenceError::NotAPolygon(feature.geometry.kind));
        }
        let coordinates: Vec<Vec<[f64; 2]>> = serde_json::from_value(feature.geometry.coordinates)?;

        let mut rings = coordinates.into_iter().map(|ring| {
            ring.into_iter()
                .map(|[lon, lat]| (lat, lon))
                .collect::<Ring>()
        });
        let exterior = rings.next().ok_or(GeofenceError::EmptyCollection)?;
        let mut polygon = Self::new(exterior, rings.collect())?;
        polygon.name = feature.properties.name;
        Ok(polygon)
    }

    /// Name from the source feature properties, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Inclusive membership test: boundary points count as inside.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        if on_ring_boundary(&self.exterior, lat, lon)
            || self.holes.iter().any(|h| on_ring_boundary(h, lat, lon))
        {
            return true;
        }
        ring_contains(&self.exterior, lat, lon)
            && !self.holes.iter().any(|h| ring_contains(h, lat, lon))
    }
}

/// Drops a closing duplicate vertex and checks the ring invariants.
fn normalize_ring(mut ring: Ring) -> Result<Ring, GeofenceError> {
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    let mut distinct = ring.clone();
    distinct.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    distinct.dedup();
    if distinct.len() < 3 {
        return Err(GeofenceError::TooFewVertices(distinct.len()));
    }
    if shoelace_area(&ring).abs() < MIN_RING_AREA {
        return Err(GeofenceError::DegenerateRing);
    }
    Ok(ring)
}

/// Signed shoelace area; zero for degenerate (collinear) rings.
fn shoelace_area(ring: &[(f64, f64)]) -> f64 {
    let mut sum = 0.0;
    for (i, &(lat_a, lon_a)) in ring.iter().enumerate() {
        let (lat_b, lon_b) = ring[(i + 1) % ring.len()];
        sum += lon_a * lat_b - lon_b * lat_a;
    }
    sum / 2.0
}

/// Even-odd ray cast, ray running east from the query point.
fn ring_contains(ring: &[(f64, f64)], lat: f64, lon: f64) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (lat_i, lon_i) = ring[i];
        let (lat_j, lon_j) = ring[j];
        if (lat_i > lat) != (lat_j > lat) {
            let cross_lon = lon_i + (lat - lat_i) / (lat_j - lat_i) * (lon_j - lon_i);
            if lon < cross_lon {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// True when the point lies on any segment of the ring, within tolerance.
fn on_ring_boundary(ring: &[(f64, f64)], lat: f64, lon: f64) -> bool {
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        if on_segment(ring[j], ring[i], lat, lon) {
            return true;
        }
        j = i;
    }
    false
}

fn on_segment(a: (f64, f64), b: (f64, f64), lat: f64, lon: f64) -> bool {
    let cross = (b.0 - a.0) * (lon - a.1) - (b.1 - a.1) * (lat - a.0);
    if cross.abs() > BOUNDARY_EPS {
        return false;
    }
    let within_lat = lat >= a.0.min(b.0) - BOUNDARY_EPS && lat <= a.0.max(b.0) + BOUNDARY_EPS;
    let within_lon = lon >= a.1.min(b.1) - BOUNDARY_EPS && lon <= a.1.max(b.1) + BOUNDARY_EPS;
    within_lat && within_lon
}

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Geometry,
    #[serde(default)]
    properties: FeatureProperties,
}

#[derive(Deserialize, Default)]
struct FeatureProperties {
    name: Option<String>,
}

#[derive(Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unit_square() -> GeofencePolygon {
        GeofencePolygon::new(
            vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn interior_point_is_inside() {
        assert!(unit_square().contains(0.5, 0.5));
    }

    #[test]
    fn exterior_point_is_outside() {
        assert!(!unit_square().contains(2.0, 2.0));
        assert!(!unit_square().contains(-0.1, 0.5));
    }

    #[test]
    fn boundary_points_count_as_inside() {
        let square = unit_square();
        // Edges and corners.
        assert!(square.contains(0.0, 0.5));
        assert!(square.contains(0.5, 1.0));
        assert!(square.contains(1.0, 1.0));
        assert!(square.contains(0.0, 0.0));
    }

    #[test]
    fn hole_subtracts_membership() {
        let donut = GeofencePolygon::new(
            vec![(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0)],
            vec![vec![(1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0)]],
        )
        .unwrap();
        assert!(donut.contains(0.5, 0.5));
        assert!(!donut.contains(2.0, 2.0));
        // Hole boundary is still polygon boundary.
        assert!(donut.contains(1.0, 2.0));
    }

    #[test]
    fn closing_duplicate_vertex_is_accepted() {
        let square = GeofencePolygon::new(
            vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)],
            vec![],
        )
        .unwrap();
        assert!(square.contains(0.5, 0.5));
    }

    #[test]
    fn too_few_vertices_rejected() {
        let err = GeofencePolygon::new(vec![(0.0, 0.0), (1.0, 1.0)], vec![]).unwrap_err();
        assert!(matches!(err, GeofenceError::TooFewVertices(2)));
    }

    #[test]
    fn zero_area_ring_rejected() {
        let err =
            GeofencePolygon::new(vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)], vec![]).unwrap_err();
        assert!(matches!(err, GeofenceError::DegenerateRing));
    }

    #[test]
    fn small_but_real_zone_is_accepted() {
        // Roughly 100 m on a side at 60N.
        let zone = GeofencePolygon::new(
            vec![
                (60.0, 25.0),
                (60.0, 25.001),
                (60.001, 25.001),
                (60.001, 25.0),
            ],
            vec![],
        )
        .unwrap();
        assert!(zone.contains(60.0005, 25.0005));
        assert!(!zone.contains(60.002, 25.0005));
    }

    #[test]
    fn parses_feature_collection() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"name": "Restricted zone"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[24.0, 59.0], [25.0, 59.0], [25.0, 60.0], [24.0, 60.0], [24.0, 59.0]]]
                }
            }]
        }"#;
        let polygon = GeofencePolygon::from_geojson(raw).unwrap();
        assert_eq!(polygon.name(), Some("Restricted zone"));
        // GeoJSON is [lon, lat]; 59.5N 24.5E is inside.
        assert!(polygon.contains(59.5, 24.5));
        assert!(!polygon.contains(58.0, 24.5));
    }

    #[test]
    fn rejects_non_polygon_geometry() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [24.5, 59.5]}
            }]
        }"#;
        assert!(matches!(
            GeofencePolygon::from_geojson(raw),
            Err(GeofenceError::NotAPolygon(kind)) if kind == "Point"
        ));
    }

    #[test]
    fn rejects_empty_collection() {
        let raw = r#"{"type": "FeatureCollection", "features": []}"#;
        assert!(matches!(
            GeofencePolygon::from_geojson(raw),
            Err(GeofenceError::EmptyCollection)
        ));
    }

    proptest! {
        /// Any point strictly inside the unit square tests inside, and the
        /// point shifted well outside tests outside.
        #[test]
        fn interior_inside_exterior_outside(lat in 0.001f64..0.999, lon in 0.001f64..0.999) {
            let square = unit_square();
            prop_assert!(square.contains(lat, lon));
            prop_assert!(!square.contains(lat + 2.0, lon));
        }

        /// Every vertex of a ring lies on its own boundary.
        #[test]
        fn vertices_are_contained(lat in -50.0f64..50.0, lon in -50.0f64..50.0) {
            let square = GeofencePolygon::new(
                vec![(lat, lon), (lat, lon + 1.0), (lat + 1.0, lon + 1.0), (lat + 1.0, lon)],
                vec![],
            ).unwrap();
            prop_assert!(square.contains(lat, lon));
            prop_assert!(square.contains(lat + 1.0, lon + 1.0));
        }
    }
}
