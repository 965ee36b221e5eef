//! Storage traits isolating the services from their backing stores.
//!
//! Both services in the `gatebox` crate are generic over these traits. The
//! bundled `gatebox-memory` stores are purely in-process and infallible; the
//! traits are nevertheless async and fallible so a networked store (for
//! consistent limiting and cache coherence across instances) is a drop-in
//! replacement without changing the service contracts.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::limit::{LimitEntry, LimitKey};
use crate::value::{CacheStats, CacheValue};
use crate::{CacheKey, Raw};

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Internal store error, state or computation error.
    ///
    /// Any error not related to network interaction.
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send>),

    /// Network interaction error.
    ///
    /// Errors occurring during communication with remote stores.
    #[error(transparent)]
    Connection(Box<dyn std::error::Error + Send>),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of a delete operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Number of entries deleted.
    Deleted(u64),
    /// Nothing matched the key.
    Missing,
}

/// Storage for per-key rate-limit window state.
///
/// Invariant: at most one [`LimitEntry`] exists per [`LimitKey`] at any time.
#[async_trait]
pub trait LimitStore: Send + Sync {
    /// Loads the entry for a key, if present.
    async fn load(&self, key: &LimitKey) -> StoreResult<Option<LimitEntry>>;

    /// Stores (or overwrites) the entry for a key.
    async fn save(&self, key: LimitKey, entry: LimitEntry) -> StoreResult<()>;

    /// Removes the entry for a key.
    async fn remove(&self, key: &LimitKey) -> StoreResult<DeleteStatus>;

    /// Removes entries that are logically dead at `now` (window elapsed and
    /// block cleared). Returns the number removed.
    async fn purge(&self, now: DateTime<Utc>) -> StoreResult<usize>;

    /// Store name used in logs.
    fn name(&self) -> &str {
        "limit-store"
    }
}

/// Storage for serialized cache entries, indexed by key and by tag.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Reads the entry under a key, expired or not; freshness is the
    /// service's concern.
    async fn read(&self, key: &CacheKey) -> StoreResult<Option<CacheValue<Raw>>>;

    /// Stores (or overwrites) the entry under a key.
    async fn write(&self, key: CacheKey, value: CacheValue<Raw>) -> StoreResult<()>;

    /// Removes the entry under a key.
    async fn remove(&self, key: &CacheKey) -> StoreResult<DeleteStatus>;

    /// Removes every entry carrying the tag. Returns the number removed.
    async fn remove_by_tag(&self, tag: &str) -> StoreResult<usize>;

    /// Removes all entries. Returns the number removed.
    async fn clear(&self) -> StoreResult<usize>;

    /// Removes entries expired at `now`. Returns the number removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<usize>;

    /// Counts entries by freshness at `now`.
    async fn stats(&self, now: DateTime<Utc>) -> StoreResult<CacheStats>;

    /// Store name used in logs.
    fn name(&self) -> &str {
        "cache-store"
    }
}

#[async_trait]
impl<S: LimitStore + ?Sized> LimitStore for Arc<S> {
    async fn load(&self, key: &LimitKey) -> StoreResult<Option<LimitEntry>> {
        (**self).load(key).await
    }

    async fn save(&self, key: LimitKey, entry: LimitEntry) -> StoreResult<()> {
        (**self).save(key, entry).await
    }

    async fn remove(&self, key: &LimitKey) -> StoreResult<DeleteStatus> {
        (**self).remove(key).await
    }

    async fn purge(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        (**self).purge(now).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<S: CacheStore + ?Sized> CacheStore for Arc<S> {
    async fn read(&self, key: &CacheKey) -> StoreResult<Option<CacheValue<Raw>>> {
        (**self).read(key).await
    }

    async fn write(&self, key: CacheKey, value: CacheValue<Raw>) -> StoreResult<()> {
        (**self).write(key, value).await
    }

    async fn remove(&self, key: &CacheKey) -> StoreResult<DeleteStatus> {
        (**self).remove(key).await
    }

    async fn remove_by_tag(&self, tag: &str) -> StoreResult<usize> {
        (**self).remove_by_tag(tag).await
    }

    async fn clear(&self) -> StoreResult<usize> {
        (**self).clear().await
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> StoreResult<usize> {
        (**self).purge_expired(now).await
    }

    async fn stats(&self, now: DateTime<Utc>) -> StoreResult<CacheStats> {
        (**self).stats(now).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
