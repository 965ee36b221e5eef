//! Background sweeps for expiry and dead-entry cleanup.
//!
//! Reads already drop expired state lazily; the sweeper exists so entries
//! nobody touches again do not accumulate forever. Tests never wait on it —
//! they call [`TtlCache::cleanup_expired`] or [`RateLimiter::purge_dead`]
//! directly.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use gatebox_core::store::{CacheStore, LimitStore};

use crate::cache::TtlCache;
use crate::limiter::RateLimiter;

/// Default cadence for both sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Handle to a periodic sweep task.
///
/// The underlying tokio task is aborted when the handle is dropped.
///
/// # Example
///
/// ```no_run
/// use gatebox::{Sweeper, TtlCache, DEFAULT_SWEEP_INTERVAL};
/// use gatebox_memory::InMemoryCacheStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let cache = TtlCache::new(InMemoryCacheStore::new());
/// let _sweeper = Sweeper::cache(cache.clone(), DEFAULT_SWEEP_INTERVAL);
/// // cache stays usable; the sweeper owns its own clone.
/// # }
/// ```
#[derive(Debug)]
pub struct Sweeper {
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawns a task sweeping expired entries out of `cache` every `period`.
    pub fn cache<S>(cache: TtlCache<S>, period: Duration) -> Self
    where
        S: CacheStore + Clone + 'static,
    {
        Self::spawn(period, move || {
            let cache = cache.clone();
            async move {
                match cache.cleanup_expired().await {
                    Ok(removed) => debug!(removed, "cache sweep finished"),
                    Err(error) => warn!(%error, "cache sweep failed"),
                }
            }
        })
    }

    /// Spawns a task purging dead limit entries out of `limiter` every
    /// `period`.
    pub fn limiter<S>(limiter: RateLimiter<S>, period: Duration) -> Self
    where
        S: LimitStore + Clone + 'static,
    {
        Self::spawn(period, move || {
            let limiter = limiter.clone();
            async move {
                match limiter.purge_dead().await {
                    Ok(removed) => debug!(removed, "limiter sweep finished"),
                    Err(error) => warn!(%error, "limiter sweep failed"),
                }
            }
        })
    }

    fn spawn<F, Fut>(period: Duration, mut sweep: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; skip it so the first
            // sweep runs one full period after spawn.
            interval.tick().await;
            loop {
                interval.tick().await;
                sweep().await;
            }
        });
        Sweeper { handle }
    }

    /// True once the task has stopped (only after [`abort`](Sweeper::abort)).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stops the sweep task.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
