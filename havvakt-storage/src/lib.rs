//! # havvakt-storage
//!
//! SQLite persistence of position history and breach state, so a restart
//! does not lose an in-flight intrusion episode or the rendered trails.
//! The core defines the shapes; this crate only maps them to rows.

mod store;

pub use store::{StorageError, TrailDb};
