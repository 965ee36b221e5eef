//! In-process cache store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use gatebox_core::store::{CacheStore, DeleteStatus, StoreResult};
use gatebox_core::{CacheKey, CacheStats, CacheValue, Raw};

/// In-memory cache store with linear-scan tag removal.
///
/// Tag and expiry scans walk every entry; that matches the intended scale
/// (one process, periodic sweeps) and keeps writes free of index upkeep.
/// A `Clone` of the store shares the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCacheStore {
    entries: Arc<DashMap<CacheKey, CacheValue<Raw>>>,
}

impl InMemoryCacheStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries physically present, fresh or expired.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn read(&self, key: &CacheKey) -> StoreResult<Option<CacheValue<Raw>>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn write(&self, key: CacheKey, value: CacheValue<Raw>) -> StoreResult<()> {
        self.entries.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> StoreResult<DeleteStatus> {
        match self.entries.remove(key) {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    async fn remove_by_tag(&self, tag: &str) -> StoreResult<usize> {
        let matching: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|entry| entry.value().has_tag(tag))
            .map(|entry| entry.key().clone())
            .collect();
        let mut removed = 0;
        for key in matching {
            if self.entries.remove(&key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn clear(&self) -> StoreResult<usize> {
        let removed = self.entries.len();
        self.entries.clear();
        Ok(removed)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        let before = self.entries.len();
        self.entries.retain(|_, value| !value.is_expired(now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "purged expired cache entries");
        }
        Ok(removed)
    }

    async fn stats(&self, now: DateTime<Utc>) -> StoreResult<CacheStats> {
        let mut stats = CacheStats::default();
        for entry in self.entries.iter() {
            stats.total += 1;
            if entry.value().is_expired(now) {
                stats.expired += 1;
            } else {
                stats.active += 1;
            }
        }
        Ok(stats)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
