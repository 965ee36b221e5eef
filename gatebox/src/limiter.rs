//! Sliding-window rate limiter with block-on-exceed.

use std::sync::Arc;

use smol_str::SmolStr;
use tracing::{debug, warn};

use gatebox_core::store::LimitStore;
use gatebox_core::{Clock, LimitClass, LimitDecision, LimitEntry, LimitKey, SystemClock};

use crate::error::{Error, RateLimitError};
use crate::policy::LimitClasses;

/// Per-identifier, per-class rate limiter.
///
/// Counts attempts in a **truncating** sliding window and imposes a cooldown
/// block once the window's quota is exceeded. The window fully resets at its
/// boundary instead of decaying; an active block outlives the window it was
/// imposed in.
///
/// Identifiers are caller-supplied strings. For HTTP traffic the convention
/// is the left-most `X-Forwarded-For` entry, falling back to `X-Real-IP`,
/// falling back to the literal `"unknown"` — or an authenticated user id
/// where available. Never mix both for the same class.
///
/// Two entry points cover both caller idioms:
/// [`check`](RateLimiter::check) reports denial in its return value and
/// never fails on its own; [`enforce`](RateLimiter::enforce) converts denial
/// into [`RateLimitError`] for exception-style control flow.
///
/// # Example
///
/// ```
/// use gatebox::RateLimiter;
/// use gatebox_memory::InMemoryLimitStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), gatebox::Error> {
/// let limiter = RateLimiter::new(InMemoryLimitStore::new());
///
/// let decision = limiter.check("203.0.113.7", "login").await?;
/// assert!(decision.allowed);
/// assert_eq!(decision.remaining, 4);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RateLimiter<S> {
    store: S,
    classes: LimitClasses,
    clock: Arc<dyn Clock>,
}

impl<S: LimitStore> RateLimiter<S> {
    /// Creates a limiter over `store` with the default class table and the
    /// system clock.
    pub fn new(store: S) -> Self {
        Self::builder(store).build()
    }

    /// Starts building a limiter with a custom class table or clock.
    pub fn builder(store: S) -> RateLimiterBuilder<S> {
        RateLimiterBuilder {
            store,
            classes: LimitClasses::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Decides whether the current attempt for `(class, identifier)` may
    /// proceed, and records it.
    ///
    /// State transition per call:
    /// 1. No entry, or the window has elapsed: start a fresh window with
    ///    `count = 0`.
    /// 2. An active block rejects the attempt without counting it.
    /// 3. Otherwise the attempt is counted; exceeding the quota imposes a
    ///    block of the class's block duration.
    ///
    /// Denial is reported in the returned [`LimitDecision`], never as an
    /// error; `Err` only surfaces store transport failures (the in-memory
    /// store has none).
    ///
    /// # Panics
    ///
    /// Panics if `class` is not registered — an unregistered class is a
    /// configuration bug, not a runtime condition.
    pub async fn check(&self, identifier: &str, class: &str) -> Result<LimitDecision, Error> {
        let limit = self
            .classes
            .get(class)
            .unwrap_or_else(|| panic!("unknown limit class `{class}`; register it at startup"))
            .clone();
        let key = LimitKey::new(class, identifier);
        let now = self.clock.now();

        let existing = self.store.load(&key).await?;
        if let Some(entry) = &existing
            && entry.is_blocked(now)
        {
            debug!(%key, blocked_until = ?entry.blocked_until, "attempt rejected while block active");
            return Ok(LimitDecision::denied(entry));
        }

        let mut entry = match existing {
            Some(entry) if !entry.window_elapsed(now) => entry,
            _ => LimitEntry::fresh(now, limit.window()),
        };
        entry.count += 1;

        let decision = if entry.count > limit.max_attempts() {
            entry.blocked_until = Some(now + limit.block_duration());
            warn!(%key, count = entry.count, blocked_until = ?entry.blocked_until, "quota exceeded, blocking identifier");
            LimitDecision::denied(&entry)
        } else {
            debug!(%key, count = entry.count, "attempt allowed");
            LimitDecision {
                allowed: true,
                remaining: limit.max_attempts() - entry.count,
                reset_at: entry.reset_at,
                blocked_until: None,
            }
        };

        self.store.save(key, entry).await?;
        Ok(decision)
    }

    /// [`check`](RateLimiter::check), but a denial becomes
    /// [`Error::RateLimited`] carrying `retry_after` seconds and the window
    /// end for `Retry-After`/429 response metadata.
    ///
    /// # Panics
    ///
    /// Panics if `class` is not registered, like [`check`](RateLimiter::check).
    pub async fn enforce(&self, identifier: &str, class: &str) -> Result<LimitDecision, Error> {
        let decision = self.check(identifier, class).await?;
        if decision.allowed {
            return Ok(decision);
        }
        let now = self.clock.now();
        let until = decision.blocked_until.unwrap_or(decision.reset_at);
        let retry_after = ((until - now).num_milliseconds().max(0) as u64).div_ceil(1000);
        Err(Error::RateLimited(RateLimitError {
            retry_after,
            reset_at: decision.reset_at,
            blocked_until: decision.blocked_until,
        }))
    }

    /// Unconditionally forgets all state for `(class, identifier)`, block
    /// included. Used after a successful login to forgive prior failures.
    pub async fn reset(&self, identifier: &str, class: &str) -> Result<(), Error> {
        let key = LimitKey::new(class, identifier);
        self.store.remove(&key).await?;
        debug!(%key, "limit entry reset");
        Ok(())
    }

    /// Removes entries whose window and block have both passed. Returns the
    /// number removed. Run periodically by the
    /// [`Sweeper`](crate::sweep::Sweeper); callable directly in tests.
    pub async fn purge_dead(&self) -> Result<usize, Error> {
        Ok(self.store.purge(self.clock.now()).await?)
    }
}

/// Builder for [`RateLimiter`].
///
/// Created via [`RateLimiter::builder`]. Starts from the default class table;
/// [`class`](RateLimiterBuilder::class) adds or overrides entries,
/// [`classes`](RateLimiterBuilder::classes) replaces the table wholesale.
#[derive(Debug)]
pub struct RateLimiterBuilder<S> {
    store: S,
    classes: LimitClasses,
    clock: Arc<dyn Clock>,
}

impl<S> RateLimiterBuilder<S> {
    /// Replaces the class table.
    pub fn classes(mut self, classes: LimitClasses) -> Self {
        self.classes = classes;
        self
    }

    /// Registers (or overrides) a single class.
    pub fn class(mut self, name: impl Into<SmolStr>, class: LimitClass) -> Self {
        self.classes.insert(name, class);
        self
    }

    /// Replaces the time source. Tests inject a
    /// [`ManualClock`](gatebox_core::ManualClock) here.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builds the limiter.
    pub fn build(self) -> RateLimiter<S> {
        RateLimiter {
            store: self.store,
            classes: self.classes,
            clock: self.clock,
        }
    }
}
