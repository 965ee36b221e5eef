//! Cached value wrapper with expiry metadata and tag set.
//!
//! [`CacheValue`] wraps a payload with the absolute instant it expires and
//! the tags it carries for grouped invalidation. Reading an expired entry
//! must behave exactly like a miss; the services enforce that by checking
//! [`CacheValue::is_expired`] on every read path, independent of background
//! sweeps.

use chrono::{DateTime, Utc};
use smol_str::SmolStr;

/// A cached value with expiry metadata.
///
/// # Example
///
/// ```
/// use chrono::{TimeDelta, Utc};
/// use gatebox_core::CacheValue;
///
/// let expires_at = Utc::now() + TimeDelta::seconds(60);
/// let value = CacheValue::new("payload", expires_at, vec!["tickets".into()]);
/// assert!(value.has_tag("tickets"));
/// assert!(!value.is_expired(Utc::now()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheValue<T> {
    data: T,
    expires_at: DateTime<Utc>,
    tags: Vec<SmolStr>,
}

impl<T> CacheValue<T> {
    /// Wraps `data` with an absolute expiry and a tag set.
    pub fn new(data: T, expires_at: DateTime<Utc>, tags: Vec<SmolStr>) -> Self {
        CacheValue {
            data,
            expires_at,
            tags,
        }
    }

    /// Returns a reference to the payload.
    #[inline]
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Returns when the value expires.
    #[inline]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns the tags attached to this value.
    #[inline]
    pub fn tags(&self) -> &[SmolStr] {
        &self.tags
    }

    /// True when the value carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// True once the expiry instant has been reached.
    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Consumes the wrapper and returns the payload.
    pub fn into_inner(self) -> T {
        self.data
    }
}

/// Diagnostic snapshot of a cache store.
///
/// `active` counts entries still within their TTL, `expired` counts entries
/// physically present but past their expiry (not yet swept or lazily
/// removed). `total = active + expired`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries physically present in the store.
    pub total: usize,
    /// Entries whose expiry is still in the future.
    pub active: usize,
    /// Entries past expiry but not yet removed.
    pub expired: usize,
}
