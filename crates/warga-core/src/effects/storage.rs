//! Key-value storage effect
//!
//! An opaque byte store with get/set, prefix listing and a conditional
//! write. The conditional write is what the engine uses for every
//! read-modify-write, so implementations must make it atomic per key.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for storage operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum StorageError {
    /// Key was rejected by the backend.
    #[error("Invalid key: {reason}")]
    InvalidKey {
        /// Why the key was rejected
        reason: String,
    },
    /// Read failed.
    #[error("Read failed: {0}")]
    ReadFailed(String),
    /// Write failed.
    #[error("Write failed: {0}")]
    WriteFailed(String),
    /// Delete failed.
    #[error("Delete failed: {0}")]
    DeleteFailed(String),
}

/// Storage collaborator.
#[async_trait]
pub trait StorageEffects: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Retrieve the value under `key`.
    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Remove `key`, returning whether it existed.
    async fn remove(&self, key: &str) -> Result<bool, StorageError>;

    /// List keys, optionally restricted to a prefix.
    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError>;

    /// Atomically replace the value under `key` if it currently equals
    /// `expected` (`None` meaning absent). Returns `false` without writing
    /// when the current value differs.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: Vec<u8>,
    ) -> Result<bool, StorageError>;

    /// Atomically remove `key` if it currently equals `expected`.
    async fn compare_and_remove(&self, key: &str, expected: &[u8]) -> Result<bool, StorageError>;
}

#[async_trait]
impl<T: StorageEffects + ?Sized> StorageEffects for std::sync::Arc<T> {
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        (**self).store(key, value).await
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).retrieve(key).await
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        (**self).remove(key).await
    }

    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError> {
        (**self).list_keys(prefix).await
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: Vec<u8>,
    ) -> Result<bool, StorageError> {
        (**self).compare_and_swap(key, expected, new).await
    }

    async fn compare_and_remove(&self, key: &str, expected: &[u8]) -> Result<bool, StorageError> {
        (**self).compare_and_remove(key, expected).await
    }
}
