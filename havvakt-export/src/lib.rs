//! # havvakt-export
//!
//! GeoJSON map artifacts rendered once per cycle: the current vessel
//! positions, the bounded trails, and a copy of the restricted area. The
//! builders are pure (value in, `serde_json::Value` out) so the engine can
//! assemble snapshots under its state lock and write afterwards.

mod exporter;

pub use exporter::{build_trails_collection, build_vessels_collection, ExportError, GeoJsonExporter};
