//! In-process limit store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use gatebox_core::store::{DeleteStatus, LimitStore, StoreResult};
use gatebox_core::{LimitEntry, LimitKey};

/// In-memory limit store keyed by `(class, identifier)`.
///
/// A `Clone` of the store shares the same underlying map.
///
/// # Example
///
/// ```
/// use gatebox_memory::InMemoryLimitStore;
///
/// let store = InMemoryLimitStore::new();
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryLimitStore {
    entries: Arc<DashMap<LimitKey, LimitEntry>>,
}

impl InMemoryLimitStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries physically present, dead or alive.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl LimitStore for InMemoryLimitStore {
    async fn load(&self, key: &LimitKey) -> StoreResult<Option<LimitEntry>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn save(&self, key: LimitKey, entry: LimitEntry) -> StoreResult<()> {
        self.entries.insert(key, entry);
        Ok(())
    }

    async fn remove(&self, key: &LimitKey) -> StoreResult<DeleteStatus> {
        match self.entries.remove(key) {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    async fn purge(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_dead(now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "purged dead limit entries");
        }
        Ok(removed)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
