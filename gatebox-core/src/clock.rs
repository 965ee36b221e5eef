//! Time source abstraction.
//!
//! Every time-dependent decision in Gatebox (window resets, block expiry,
//! cache TTLs, sweeps) reads the current instant through the [`Clock`] trait
//! instead of calling [`Utc::now`] directly. Production code uses
//! [`SystemClock`]; tests inject a [`ManualClock`] and drive it forward
//! explicitly, so window boundaries and expiry are exercised without
//! sleeping on wall-clock time.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};

/// A source of the current instant.
pub trait Clock: std::fmt::Debug + Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation backed by [`Utc::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for deterministic tests.
///
/// The instant only moves when [`advance`](ManualClock::advance) or
/// [`set`](ManualClock::set) is called. Stored as epoch milliseconds in an
/// atomic so a shared handle can be advanced from the test while the service
/// under test reads it.
///
/// # Example
///
/// ```
/// use chrono::{TimeDelta, Utc};
/// use gatebox_core::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(Utc::now());
/// let before = clock.now();
/// clock.advance(TimeDelta::seconds(61));
/// assert_eq!(clock.now() - before, TimeDelta::seconds(61));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// Creates a manual clock frozen at the given instant.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        self.millis
            .fetch_add(delta.num_milliseconds(), Ordering::SeqCst);
    }

    /// Jumps the clock to an absolute instant.
    pub fn set(&self, to: DateTime<Utc>) {
        self.millis.store(to.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst))
            .unwrap_or(DateTime::UNIX_EPOCH)
    }
}
