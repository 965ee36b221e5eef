#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Tag-indexed TTL cache service.
///
/// [`TtlCache`](cache::TtlCache) memoizes expensive reads with per-entry
/// expiry, exact-key and tag-grouped invalidation, and a
/// [`with_cache`](cache::TtlCache::with_cache) entry point that computes on
/// miss and returns the cached value on hit.
pub mod cache;

/// YAML configuration for policy tables and sweep cadence.
pub mod config;

/// Error types for limiter and cache operations.
///
/// Defines [`Error`] plus [`RateLimitError`], the distinguished denial error
/// carrying `Retry-After` metadata for the exception-style limiter path.
pub mod error;

/// Sliding-window rate limiter with block-on-exceed.
///
/// [`RateLimiter`](limiter::RateLimiter) counts attempts per
/// `(class, identifier)` in a truncating window and imposes a cooldown block
/// once the quota is exceeded.
pub mod limiter;

/// Policy registries with the built-in limit and dataset tables.
pub mod policy;

/// Background sweeps for expiry and dead-entry cleanup.
pub mod sweep;

pub use cache::TtlCache;
pub use config::{CachePolicyConfig, Config, ConfigError, LimitClassConfig};
pub use error::{Error, RateLimitError};
pub use limiter::{RateLimiter, RateLimiterBuilder};
pub use policy::{CachePolicies, LimitClasses};
pub use sweep::{DEFAULT_SWEEP_INTERVAL, Sweeper};

pub use gatebox_core::{
    CacheKey, CacheKeyBuilder, CachePolicy, CacheStats, Clock, LimitClass, LimitDecision,
    SystemClock,
};

/// The `gatebox` prelude.
///
/// ```rust
/// use gatebox::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{CacheKey, Error, RateLimitError, RateLimiter, TtlCache};
}
