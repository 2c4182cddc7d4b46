//! GeoJSON map export configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ExportConfig {
    /// Write vessels/trails/restricted GeoJSON each cycle?
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Output directory, created if missing.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_dir() -> PathBuf {
    "out".into()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            dir: default_dir(),
        }
    }
}
