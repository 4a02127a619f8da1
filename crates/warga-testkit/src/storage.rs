//! Storage that lets another writer in between a read and a conditional write

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use warga_core::effects::{StorageEffects, StorageError};
use warga_effects::MemoryStorageHandler;

/// Wraps [`MemoryStorageHandler`] and lands queued foreign writes right
/// before a `compare_and_swap` or `compare_and_remove` on the same key.
///
/// Each queued value is consumed by one conditional write, which then sees
/// the foreign value instead of what the caller read and fails. This gives
/// tests a deterministic way to drive the engine's retry loops.
#[derive(Debug, Clone, Default)]
pub struct InterleavedStorage {
    inner: Arc<MemoryStorageHandler>,
    pending: Arc<Mutex<HashMap<String, VecDeque<Vec<u8>>>>>,
    failed_swaps: Arc<AtomicUsize>,
}

impl InterleavedStorage {
    /// Wrap an existing store.
    pub fn new(inner: MemoryStorageHandler) -> Self {
        Self {
            inner: Arc::new(inner),
            pending: Arc::default(),
            failed_swaps: Arc::default(),
        }
    }

    /// Queue a foreign write to `key`, landed before its next conditional write.
    pub fn interleave(&self, key: impl Into<String>, value: Vec<u8>) {
        self.pending
            .lock()
            .unwrap()
            .entry(key.into())
            .or_default()
            .push_back(value);
    }

    /// Conditional writes that found a different value than expected.
    pub fn failed_swaps(&self) -> usize {
        self.failed_swaps.load(Ordering::SeqCst)
    }

    /// Foreign writes still waiting for their key.
    pub fn pending_writes(&self) -> usize {
        self.pending.lock().unwrap().values().map(VecDeque::len).sum()
    }

    /// Underlying store.
    pub fn inner(&self) -> &MemoryStorageHandler {
        &self.inner
    }

    fn next_foreign_write(&self, key: &str) -> Option<Vec<u8>> {
        self.pending.lock().unwrap().get_mut(key)?.pop_front()
    }

    fn record(&self, written: bool) -> bool {
        if !written {
            self.failed_swaps.fetch_add(1, Ordering::SeqCst);
        }
        written
    }
}

#[async_trait]
impl StorageEffects for InterleavedStorage {
    async fn store(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.inner.store(key, value).await
    }

    async fn retrieve(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.retrieve(key).await
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.remove(key).await
    }

    async fn list_keys(&self, prefix: Option<&str>) -> Result<Vec<String>, StorageError> {
        self.inner.list_keys(prefix).await
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: Vec<u8>,
    ) -> Result<bool, StorageError> {
        if let Some(foreign) = self.next_foreign_write(key) {
            self.inner.store(key, foreign).await?;
        }
        let swapped = self.inner.compare_and_swap(key, expected, new).await?;
        Ok(self.record(swapped))
    }

    async fn compare_and_remove(&self, key: &str, expected: &[u8]) -> Result<bool, StorageError> {
        if let Some(foreign) = self.next_foreign_write(key) {
            self.inner.store(key, foreign).await?;
        }
        let removed = self.inner.compare_and_remove(key, expected).await?;
        Ok(self.record(removed))
    }
}
