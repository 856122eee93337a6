use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is unavailable: {0}")]
    Unavailable(String),

    #[error("storage quota exceeded while writing {key}")]
    QuotaExceeded { key: String },

    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// String key/value persistence scoped to one browsing context.
///
/// Implementations are free to fail on any call; callers treat every error as
/// "no data" rather than propagating it.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
