//! Cache policy type.

use chrono::TimeDelta;
use smol_str::SmolStr;

/// Default TTL and tag set for a logical dataset.
///
/// Callers store entries through a policy instead of repeating TTLs and tags
/// at every call site; per-call overrides remain possible through
/// [`TtlCache::set`](https://docs.rs/gatebox) which takes an explicit TTL.
///
/// # Example
///
/// ```
/// use chrono::TimeDelta;
/// use gatebox_core::CachePolicy;
///
/// let tickets = CachePolicy::new(TimeDelta::seconds(60), vec!["tickets".into()]);
/// assert_eq!(tickets.ttl(), TimeDelta::seconds(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    ttl: TimeDelta,
    tags: Vec<SmolStr>,
}

impl CachePolicy {
    /// Creates a policy with the given TTL and tags.
    pub fn new(ttl: TimeDelta, tags: Vec<SmolStr>) -> Self {
        CachePolicy { ttl, tags }
    }

    /// Time entries stored under this policy remain valid.
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Tags attached to entries stored under this policy.
    pub fn tags(&self) -> &[SmolStr] {
        &self.tags
    }
}
