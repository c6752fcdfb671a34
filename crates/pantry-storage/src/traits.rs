//! Storage abstraction trait
//!
//! This module defines the Storage trait that all artifact store backends implement.

use crate::StorageBackend;
use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("file is empty or could not be read")]
    EmptyContent,

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    /// The artifact could not be fetched over the network.
    #[error("{0}")]
    Transport(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Objects are addressed by key; `put` returns the object's public URL, and
/// `key_from_url` maps such a URL back to the key so consumers holding only the
/// URL from a notification payload can read the object without a network hop.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` under `key` and return the object's URL.
    ///
    /// Staged artifacts are immutable: callers generate a fresh key per upload.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<String>;

    /// Read an object by key
    async fn get(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Make the object readable through its public URL.
    async fn set_public_read(&self, key: &str) -> StorageResult<()>;

    /// Delete an object by key. Deleting a missing object succeeds.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Public URL for a key
    fn generate_url(&self, key: &str) -> String;

    /// Map a URL produced by this store back to its key.
    ///
    /// Returns `None` for URLs this store did not produce.
    fn key_from_url(&self, url: &str) -> Option<String> {
        let prefix = self.generate_url("");
        let key = url.strip_prefix(prefix.as_str())?;
        let key = key.split(['?', '#']).next().unwrap_or_default();
        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

/// Reject keys that could escape the store's namespace.
pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Every staged artifact must carry content.
pub(crate) fn ensure_not_empty(data: &[u8]) -> StorageResult<()> {
    if data.is_empty() {
        return Err(StorageError::EmptyContent);
    }
    Ok(())
}
