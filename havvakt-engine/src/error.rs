use thiserror::Error;

use havvakt_config::ConfigError;
use havvakt_core::GeofenceError;
use havvakt_export::ExportError;
use havvakt_feed::FeedError;
use havvakt_storage::StorageError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("geofence error: {0}")]
    Geofence(#[from] GeofenceError),

    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("export error: {0}")]
    Export(#[from] ExportError),

    #[error("alert delivery error: {0}")]
    Notify(#[from] havvakt_alerting::NotifyError),

    #[error("task error: {0}")]
    Task(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(err: tokio::task::JoinError) -> Self {
        EngineError::Task(err.to_string())
    }
}
