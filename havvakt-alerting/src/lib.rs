//! # havvakt-alerting
//!
//! Email delivery of geofence breach alerts over SMTP. One message per
//! `AlertEvent`; deduplication is the core's job, this crate only formats
//! and sends.

mod notifier;

pub use notifier::{format_alert_body, EmailNotifier, NotifyError};
