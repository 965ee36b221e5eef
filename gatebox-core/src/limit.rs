//! Rate limit policies and per-key window state.
//!
//! A [`LimitClass`] is an immutable named policy (max attempts, window
//! length, block duration). A [`LimitEntry`] is the mutable record tracked
//! per `(class, identifier)` pair. The window is a **truncating** sliding
//! window: once `reset_at` passes the counter fully resets to zero rather
//! than decaying gradually. A client can therefore burst up to twice the
//! quota across a window boundary; that trade-off is intentional and the
//! limiter's tests pin it down.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use smol_str::SmolStr;

/// An immutable rate-limit policy.
///
/// # Example
///
/// ```
/// use chrono::TimeDelta;
/// use gatebox_core::LimitClass;
///
/// // 5 attempts per 15 minutes, then a 30 minute block.
/// let login = LimitClass::new(5, TimeDelta::minutes(15), TimeDelta::minutes(30));
/// assert_eq!(login.max_attempts(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitClass {
    max_attempts: u32,
    window: TimeDelta,
    block_duration: TimeDelta,
}

impl LimitClass {
    /// Creates a new policy.
    pub fn new(max_attempts: u32, window: TimeDelta, block_duration: TimeDelta) -> Self {
        LimitClass {
            max_attempts,
            window,
            block_duration,
        }
    }

    /// Maximum attempts allowed within one window.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Length of the counting window.
    pub fn window(&self) -> TimeDelta {
        self.window
    }

    /// Penalty duration applied once the quota is exceeded.
    pub fn block_duration(&self) -> TimeDelta {
        self.block_duration
    }
}

/// Key scoping a rate-limit decision: a limit class paired with a
/// caller-supplied identifier (an IP address or a user id — by convention
/// never both mixed within one call).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LimitKey {
    class: SmolStr,
    identifier: SmolStr,
}

impl LimitKey {
    /// Creates a key for the given class and identifier.
    pub fn new(class: impl Into<SmolStr>, identifier: impl Into<SmolStr>) -> Self {
        LimitKey {
            class: class.into(),
            identifier: identifier.into(),
        }
    }

    /// Returns the limit class name.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Returns the identifier the decision is scoped to.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl fmt::Display for LimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.class, self.identifier)
    }
}

/// Mutable per-key window record.
///
/// At most one entry exists per [`LimitKey`] at any time. An entry whose
/// window has elapsed and whose block (if any) has cleared is logically dead
/// and may be purged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitEntry {
    /// Attempts observed in the current window.
    pub count: u32,
    /// When the window ends and `count` resets to zero.
    pub reset_at: DateTime<Utc>,
    /// While `now < blocked_until`, every attempt is rejected regardless of
    /// `count`.
    pub blocked_until: Option<DateTime<Utc>>,
}

impl LimitEntry {
    /// Creates a fresh entry for a window starting at `now`.
    pub fn fresh(now: DateTime<Utc>, window: TimeDelta) -> Self {
        LimitEntry {
            count: 0,
            reset_at: now + window,
            blocked_until: None,
        }
    }

    /// True while the cooldown block is active.
    pub fn is_blocked(&self, now: DateTime<Utc>) -> bool {
        self.blocked_until.is_some_and(|until| now < until)
    }

    /// True once the counting window has ended.
    pub fn window_elapsed(&self, now: DateTime<Utc>) -> bool {
        self.reset_at <= now
    }

    /// True when both the window and any block have passed; dead entries are
    /// removed by [`LimitStore::purge`](crate::store::LimitStore::purge).
    pub fn is_dead(&self, now: DateTime<Utc>) -> bool {
        self.window_elapsed(now) && !self.is_blocked(now)
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitDecision {
    /// Whether the attempt may proceed.
    pub allowed: bool,
    /// Attempts left in the current window (zero when denied).
    pub remaining: u32,
    /// When the current window ends.
    pub reset_at: DateTime<Utc>,
    /// Set when a cooldown block is in force.
    pub blocked_until: Option<DateTime<Utc>>,
}

impl LimitDecision {
    /// Builds the denial decision for a blocked or exhausted entry.
    pub fn denied(entry: &LimitEntry) -> Self {
        LimitDecision {
            allowed: false,
            remaining: 0,
            reset_at: entry.reset_at,
            blocked_until: entry.blocked_until,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn fresh_entry_starts_empty() {
        let entry = LimitEntry::fresh(at(0), TimeDelta::seconds(60));
        assert_eq!(entry.count, 0);
        assert_eq!(entry.reset_at, at(60));
        assert!(entry.blocked_until.is_none());
        assert!(!entry.is_blocked(at(0)));
    }

    #[test]
    fn entry_is_dead_only_after_window_and_block() {
        let mut entry = LimitEntry::fresh(at(0), TimeDelta::seconds(60));
        entry.blocked_until = Some(at(120));

        // Window still open.
        assert!(!entry.is_dead(at(30)));
        // Window elapsed but block still active.
        assert!(!entry.is_dead(at(90)));
        // Both passed.
        assert!(entry.is_dead(at(120)));
    }

    #[test]
    fn unblocked_entry_dies_with_the_window() {
        let entry = LimitEntry::fresh(at(0), TimeDelta::seconds(60));
        assert!(!entry.is_dead(at(59)));
        assert!(entry.is_dead(at(60)));
    }

    #[test]
    fn limit_key_display_is_class_then_identifier() {
        let key = LimitKey::new("login", "203.0.113.7");
        assert_eq!(key.to_string(), "login:203.0.113.7");
    }
}
