//! Error type shared by every ChoreSync crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChoreSyncError>;

#[derive(Debug, Error)]
pub enum ChoreSyncError {
    /// A query or read against the document store failed.
    #[error("Store error: {0}")]
    Store(String),

    /// The push transport could not complete a request.
    #[error("Push error: {0}")]
    Push(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ChoreSyncError {
    /// True when the failure came from the document store.
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
