//! Error types for limiter and cache operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use gatebox_core::store::StoreError;

/// Raised by [`RateLimiter::enforce`](crate::RateLimiter::enforce) when a
/// check is denied.
///
/// Callers conventionally map `retry_after` to a `Retry-After` header and
/// respond with HTTP 429; [`reset_at_iso8601`](RateLimitError::reset_at_iso8601)
/// renders the window end for response metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rate limit exceeded, retry after {retry_after}s")]
pub struct RateLimitError {
    /// Whole seconds (rounded up) until the block or window clears.
    pub retry_after: u64,
    /// When the current window ends.
    pub reset_at: DateTime<Utc>,
    /// Set when a cooldown block is in force.
    pub blocked_until: Option<DateTime<Utc>>,
}

impl RateLimitError {
    /// Renders `reset_at` as an ISO-8601 timestamp.
    pub fn reset_at_iso8601(&self) -> String {
        self.reset_at.to_rfc3339()
    }
}

/// Error type for gatebox service operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage failure; never produced by the in-memory stores.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Cache value (de)serialization failure.
    #[error("cache value codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Denial surfaced through the exception-style
    /// [`enforce`](crate::RateLimiter::enforce) path.
    #[error(transparent)]
    RateLimited(#[from] RateLimitError),

    /// A [`with_cache`](crate::TtlCache::with_cache) producer failed. The
    /// failure is passed through unwrapped and nothing is cached.
    #[error(transparent)]
    Producer(Box<dyn std::error::Error + Send + Sync>),
}
