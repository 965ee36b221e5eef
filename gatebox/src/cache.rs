//! Tag-indexed TTL cache service.

use std::future::Future;
use std::sync::Arc;

use chrono::TimeDelta;
use serde::Serialize;
use serde::de::DeserializeOwned;
use smol_str::SmolStr;
use tracing::{debug, info};

use gatebox_core::store::CacheStore;
use gatebox_core::{CacheKey, CachePolicy, CacheStats, CacheValue, Clock, Raw, SystemClock};

use crate::error::Error;

/// Memoization layer over a [`CacheStore`].
///
/// Values are serialized to JSON at this boundary, so the store stays
/// type-erased and a networked store is a drop-in replacement. An entry past
/// its expiry behaves exactly like a miss on every read path and is removed
/// as a side effect — expired data is never returned, even between sweeps.
///
/// There is no single-flight de-duplication: two concurrent
/// [`with_cache`](TtlCache::with_cache) calls for the same missing key may
/// both invoke their producer; last write wins, which is redundant work, not
/// corruption.
///
/// # Example
///
/// ```
/// use gatebox::{CachePolicies, TtlCache};
/// use gatebox_core::CacheKey;
/// use gatebox_memory::InMemoryCacheStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), gatebox::Error> {
/// let cache = TtlCache::new(InMemoryCacheStore::new());
/// let policies = CachePolicies::default();
///
/// let key = CacheKey::builder("tickets").param("org", &7)?.build();
/// let report = cache
///     .with_cache(key, policies.get("tickets").unwrap(), || async {
///         Ok::<_, std::io::Error>(vec!["t-1001".to_string(), "t-1002".to_string()])
///     })
///     .await?;
/// assert_eq!(report.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TtlCache<S> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: CacheStore> TtlCache<S> {
    /// Creates a cache over `store` with the system clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Creates a cache with an injected time source. Tests pass a
    /// [`ManualClock`](gatebox_core::ManualClock) here.
    pub fn with_clock(store: S, clock: Arc<dyn Clock>) -> Self {
        TtlCache { store, clock }
    }

    /// Returns the cached value under `key`, or `None` on miss.
    ///
    /// An expired entry is a miss and is deleted as a side effect.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>, Error> {
        let now = self.clock.now();
        match self.store.read(key).await? {
            None => {
                debug!(%key, "cache miss");
                Ok(None)
            }
            Some(value) if value.is_expired(now) => {
                self.store.remove(key).await?;
                debug!(%key, expired_at = %value.expires_at(), "expired entry dropped on read");
                Ok(None)
            }
            Some(value) => {
                let data = serde_json::from_slice(value.data())?;
                debug!(%key, "cache hit");
                Ok(Some(data))
            }
        }
    }

    /// Stores (or unconditionally overwrites) `value` under `key` with the
    /// given TTL and tags.
    pub async fn set<T, I>(
        &self,
        key: CacheKey,
        value: &T,
        ttl: TimeDelta,
        tags: I,
    ) -> Result<(), Error>
    where
        T: Serialize,
        I: IntoIterator,
        I::Item: Into<SmolStr>,
    {
        let data = Raw::from(serde_json::to_vec(value)?);
        let expires_at = self.clock.now() + ttl;
        let tags: Vec<SmolStr> = tags.into_iter().map(Into::into).collect();
        debug!(%key, %expires_at, ?tags, "cache set");
        self.store
            .write(key, CacheValue::new(data, expires_at, tags))
            .await?;
        Ok(())
    }

    /// [`set`](TtlCache::set) using a dataset policy's TTL and tags.
    pub async fn set_with<T: Serialize>(
        &self,
        key: CacheKey,
        value: &T,
        policy: &CachePolicy,
    ) -> Result<(), Error> {
        self.set(key, value, policy.ttl(), policy.tags().iter().cloned())
            .await
    }

    /// Removes exactly one entry. Returns whether anything was present.
    pub async fn invalidate(&self, key: &CacheKey) -> Result<bool, Error> {
        let status = self.store.remove(key).await?;
        Ok(matches!(
            status,
            gatebox_core::store::DeleteStatus::Deleted(_)
        ))
    }

    /// Removes every entry carrying `tag`. Returns the number removed.
    pub async fn invalidate_by_tag(&self, tag: &str) -> Result<usize, Error> {
        let removed = self.store.remove_by_tag(tag).await?;
        info!(tag, removed, "cache invalidated by tag");
        Ok(removed)
    }

    /// Applies [`invalidate_by_tag`](TtlCache::invalidate_by_tag) for each
    /// tag. Deletion is idempotent, so overlapping tags are harmless.
    pub async fn invalidate_by_tags<I>(&self, tags: I) -> Result<usize, Error>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut removed = 0;
        for tag in tags {
            removed += self.invalidate_by_tag(tag.as_ref()).await?;
        }
        Ok(removed)
    }

    /// Removes all entries. Returns the number removed.
    pub async fn clear(&self) -> Result<usize, Error> {
        let removed = self.store.clear().await?;
        info!(removed, "cache cleared");
        Ok(removed)
    }

    /// Removes entries past expiry that nobody has read since. Returns the
    /// number removed. Run periodically by the
    /// [`Sweeper`](crate::sweep::Sweeper); callable directly in tests.
    pub async fn cleanup_expired(&self) -> Result<usize, Error> {
        let removed = self.store.purge_expired(self.clock.now()).await?;
        if removed > 0 {
            info!(removed, "expired cache entries swept");
        }
        Ok(removed)
    }

    /// Diagnostic snapshot of the store.
    pub async fn stats(&self) -> Result<CacheStats, Error> {
        Ok(self.store.stats(self.clock.now()).await?)
    }

    /// Returns the cached value under `key`, or invokes `producer`, stores
    /// the result under the policy's TTL and tags, and returns it.
    ///
    /// This is the primary entry point; prefer it over manual
    /// [`get`](TtlCache::get)/[`set`](TtlCache::set) pairs. Producer failures
    /// surface as [`Error::Producer`] and nothing is cached for them.
    pub async fn with_cache<T, E, F, Fut>(
        &self,
        key: CacheKey,
        policy: &CachePolicy,
        producer: F,
    ) -> Result<T, Error>
    where
        T: Serialize + DeserializeOwned,
        E: std::error::Error + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get(&key).await? {
            return Ok(hit);
        }
        let produced = producer()
            .await
            .map_err(|error| Error::Producer(Box::new(error)))?;
        self.set_with(key, &produced, policy).await?;
        Ok(produced)
    }
}
