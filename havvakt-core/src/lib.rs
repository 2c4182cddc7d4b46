//! # havvakt-core
//!
//! Detection core for the Havvakt AIS geofence monitor.
//!
//! Everything in this crate is a pure transformation from (current state,
//! new position fixes) to (new state, alert events). No network, no
//! filesystem, no clock reads: the caller supplies `now` for every cycle.
//!
//! ### Key Submodules:
//! - `fix`: position fix and vessel identity types
//! - `geofence`: restricted-area polygon with inclusive containment test
//! - `trails`: bounded time-windowed movement history per vessel
//! - `breach`: edge-triggered per-vessel intrusion state machine
//! - `evaluator`: one-cycle orchestration over a batch of fixes

pub mod breach;
pub mod evaluator;
pub mod fix;
pub mod geofence;
pub mod trails;

pub use breach::{AlertEvent, BreachState, BreachStatus};
pub use evaluator::{CycleReport, Evaluator};
pub use fix::{FixError, PositionFix, VesselId, VesselInfo};
pub use geofence::{GeofenceError, GeofencePolygon};
pub use trails::TrailStore;
