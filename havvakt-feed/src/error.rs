use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed payload decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}
