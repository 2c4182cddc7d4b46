//! # havvakt-engine
//!
//! Runtime shell around the detection core: one evaluation cycle per tick,
//! fetching from the feed, driving the evaluator, then persisting, exporting
//! and delivering alerts. The core stays pure; everything effectful lives
//! behind the `FixSource` and `AlertSink` seams so tests can run whole
//! cycles without a network.

mod error;
mod runtime;
mod traits;

pub use error::EngineError;
pub use runtime::{CycleSummary, MonitorRuntime};
pub use traits::{AlertSink, EmailSink, FixSource, LogSink};
