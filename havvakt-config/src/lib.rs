//! # Havvakt Configuration System
//!
//! Hierarchical configuration for the AIS geofence monitor.
//!
//! ## Features
//! - **Unified Configuration**: single source of truth across all components
//! - **Validation**: runtime validation of ranges, URLs and the bounding box
//! - **Environment Awareness**: `HAVVAKT_*` variables override file values

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod alerts;
mod error;
mod export;
mod feed;
mod monitor;
mod storage;
mod validation;

pub use alerts::AlertConfig;
pub use error::ConfigError;
pub use export::ExportConfig;
pub use feed::{BboxConfig, FeedConfig};
pub use monitor::MonitorConfig;
pub use storage::StorageConfig;

/// Top-level configuration container for all Havvakt components.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct HavvaktConfig {
    /// AIS feed endpoints and the area-of-interest bounding box.
    #[validate(nested)]
    pub feed: FeedConfig,

    /// Geofence file, cycle interval and trail window.
    #[validate(nested)]
    pub monitor: MonitorConfig,

    /// Email alert delivery.
    #[validate(nested)]
    pub alerts: AlertConfig,

    /// GeoJSON map export.
    #[validate(nested)]
    pub export: ExportConfig,

    /// SQLite trail persistence.
    #[validate(nested)]
    pub storage: StorageConfig,
}

impl HavvaktConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/havvakt.yaml` - base settings. If missing, defaults are used.
    /// 3. `HAVVAKT_*` environment variables (nested keys split on `__`).
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(HavvaktConfig::default()));

        if Path::new("config/havvakt.yaml").exists() {
            figment = figment.merge(Yaml::file("config/havvakt.yaml"));
        }

        figment
            .merge(Env::prefixed("HAVVAKT_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Load configuration from a specific path, still honoring environment
    /// overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Figment::from(Serialized::defaults(HavvaktConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("HAVVAKT_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
