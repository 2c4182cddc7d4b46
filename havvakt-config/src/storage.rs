//! Trail persistence configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct StorageConfig {
    /// Persist trails and breach state across restarts?
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_db_path() -> PathBuf {
    "havvakt_trails.db".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            db_path: default_db_path(),
        }
    }
}
