//! # havvakt-feed
//!
//! Position acquisition from a digitraffic-style AIS HTTP API: the
//! locations endpoint yields a GeoJSON FeatureCollection of point fixes,
//! the vessels endpoint yields static metadata (names, ship types).
//!
//! Parsing is tolerant per feature: a malformed record is skipped, never
//! failing the whole batch. A bounding box from configuration pre-filters
//! fixes to the area of interest before they reach the core.

mod client;
mod error;
mod parse;

pub use client::AisClient;
pub use error::FeedError;
pub use parse::{parse_locations, parse_metadata};
