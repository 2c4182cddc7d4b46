//! # Havvakt Telemetry
//!
//! Logging and metrics for the monitor: structured tracing output plus a
//! Prometheus registry for cycle and alert counters.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
