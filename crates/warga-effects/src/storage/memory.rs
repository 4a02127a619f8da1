//! In-memory storage handler

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use warga_core::effects::{StorageEffects, StorageError};

/// In-memory storage handler.
///
/// Cloning shares the underlying map, so several engines can be pointed at
/// the same store. Conditional writes hold the write lock for the whole
/// compare-then-write, which makes them atomic per key.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageHandler {
    data: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorageHandler {
    /// Create a new, empty memory storage handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }

    fn check_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey {
                reason: "Key cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl StorageEffects for MemoryStorageHandler {
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        Self::check_key(key)?;
        let mut data = self.data.write().await;
        data.insert(key.to_string(), value);
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let mut data = self.data.write().await;
        Ok(data.remove(key).is_some())
    }

    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError> {
        let data = self.data.read().await;
        let mut keys: Vec<String> = if let Some(prefix) = prefix {
            data.keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect()
        } else {
            data.keys().cloned().collect()
        };
        keys.sort();
        Ok(keys)
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: Vec<u8>,
    ) -> Result<bool, StorageError> {
        Self::check_key(key)?;
        let mut data = self.data.write().await;
        if data.get(key).map(Vec::as_slice) != expected {
            return Ok(false);
        }
        data.insert(key.to_string(), new);
        Ok(true)
    }

    async fn compare_and_remove(&self, key: &str, expected: &[u8]) -> Result<bool, StorageError> {
        let mut data = self.data.write().await;
        if data.get(key).map(Vec::as_slice) != Some(expected) {
            return Ok(false);
        }
        data.remove(key);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_retrieve_remove() {
        let storage = MemoryStorageHandler::new();
        storage.store("user:1", b"alice".to_vec()).await.unwrap();

        assert_eq!(
            storage.retrieve("user:1").await.unwrap(),
            Some(b"alice".to_vec())
        );
        assert!(storage.remove("user:1").await.unwrap());
        assert!(!storage.remove("user:1").await.unwrap());
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_list_keys_by_prefix_is_sorted() {
        let storage = MemoryStorageHandler::new();
        storage.store("user:b", vec![1]).await.unwrap();
        storage.store("user:a", vec![2]).await.unwrap();
        storage.store("adjustment:x", vec![3]).await.unwrap();

        let keys = storage.list_keys(Some("user:")).await.unwrap();
        assert_eq!(keys, vec!["user:a".to_string(), "user:b".to_string()]);
        assert_eq!(storage.list_keys(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_compare_and_swap_insert_if_absent() {
        let storage = MemoryStorageHandler::new();
        assert!(storage
            .compare_and_swap("claim", None, b"first".to_vec())
            .await
            .unwrap());
        assert!(!storage
            .compare_and_swap("claim", None, b"second".to_vec())
            .await
            .unwrap());
        assert_eq!(
            storage.retrieve("claim").await.unwrap(),
            Some(b"first".to_vec())
        );
    }

    #[tokio::test]
    async fn test_compare_and_swap_requires_current_value() {
        let storage = MemoryStorageHandler::new();
        storage.store("k", b"v1".to_vec()).await.unwrap();

        assert!(!storage
            .compare_and_swap("k", Some(b"stale"), b"v2".to_vec())
            .await
            .unwrap());
        assert!(storage
            .compare_and_swap("k", Some(b"v1"), b"v2".to_vec())
            .await
            .unwrap());

        assert!(!storage.compare_and_remove("k", b"v1").await.unwrap());
        assert!(storage.compare_and_remove("k", b"v2").await.unwrap());
        assert!(storage.retrieve("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let storage = MemoryStorageHandler::new();
        let other = storage.clone();
        storage.store("shared", vec![9]).await.unwrap();
        assert_eq!(other.len().await, 1);
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let storage = MemoryStorageHandler::new();
        let err = storage.store("", vec![]).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey { .. }));
    }
}
