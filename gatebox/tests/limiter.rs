//! Behavioral tests for the sliding-window limiter, driven by a manual clock.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use gatebox::{Error, LimitClass, RateLimiter};
use gatebox_core::{Clock, ManualClock};
use gatebox_memory::InMemoryLimitStore;

fn limiter() -> (RateLimiter<InMemoryLimitStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let limiter = RateLimiter::builder(InMemoryLimitStore::new())
        .clock(clock.clone())
        .class(
            "tiny",
            LimitClass::new(3, TimeDelta::minutes(1), TimeDelta::minutes(5)),
        )
        .build();
    (limiter, clock)
}

#[tokio::test]
async fn attempts_count_down_remaining() {
    let (limiter, _clock) = limiter();

    for expected_remaining in [2, 1, 0] {
        let decision = limiter.check("10.0.0.1", "tiny").await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.remaining, expected_remaining);
    }
}

#[tokio::test]
async fn window_elapsing_starts_a_fresh_count() {
    let (limiter, clock) = limiter();

    limiter.check("10.0.0.1", "tiny").await.unwrap();
    limiter.check("10.0.0.1", "tiny").await.unwrap();

    // One millisecond past the window boundary: the counter fully resets.
    clock.advance(TimeDelta::minutes(1) + TimeDelta::milliseconds(1));
    let decision = limiter.check("10.0.0.1", "tiny").await.unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.remaining, 2, "second call must be a fresh first attempt");
}

#[tokio::test]
async fn block_triggers_exactly_at_overflow() {
    let (limiter, clock) = limiter();

    // The N-th call is still allowed with zero remaining.
    limiter.check("10.0.0.2", "tiny").await.unwrap();
    limiter.check("10.0.0.2", "tiny").await.unwrap();
    let last_allowed = limiter.check("10.0.0.2", "tiny").await.unwrap();
    assert!(last_allowed.allowed);
    assert_eq!(last_allowed.remaining, 0);

    // The (N+1)-th call is denied and imposes a block in the future.
    let denied = limiter.check("10.0.0.2", "tiny").await.unwrap();
    assert!(!denied.allowed);
    assert_eq!(denied.remaining, 0);
    assert_eq!(
        denied.blocked_until,
        Some(clock.now() + TimeDelta::minutes(5))
    );
}

#[tokio::test]
async fn block_persists_across_window_boundary() {
    let (limiter, clock) = limiter();

    for _ in 0..4 {
        limiter.check("10.0.0.3", "tiny").await.unwrap();
    }

    // Past the window end (1 min) but before the block end (5 min):
    // the block takes precedence over the window reset.
    clock.advance(TimeDelta::minutes(2));
    let decision = limiter.check("10.0.0.3", "tiny").await.unwrap();
    assert!(!decision.allowed);
    assert!(decision.blocked_until.is_some());

    // Once the block clears, attempts flow again in a fresh window.
    clock.advance(TimeDelta::minutes(4));
    let decision = limiter.check("10.0.0.3", "tiny").await.unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.remaining, 2);
}

#[tokio::test]
async fn blocked_attempts_are_not_counted() {
    let (limiter, _clock) = limiter();

    for _ in 0..4 {
        limiter.check("10.0.0.4", "tiny").await.unwrap();
    }
    let blocked = limiter.check("10.0.0.4", "tiny").await.unwrap();
    assert!(!blocked.allowed);

    // Hammering during the block must not extend it.
    for _ in 0..10 {
        let decision = limiter.check("10.0.0.4", "tiny").await.unwrap();
        assert_eq!(decision.blocked_until, blocked.blocked_until);
    }
}

#[tokio::test]
async fn reset_forgives_a_block() {
    let (limiter, _clock) = limiter();

    for _ in 0..5 {
        limiter.check("10.0.0.5", "tiny").await.unwrap();
    }
    limiter.reset("10.0.0.5", "tiny").await.unwrap();

    let decision = limiter.check("10.0.0.5", "tiny").await.unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.remaining, 2, "reset must behave as if first call ever");
}

#[tokio::test]
async fn login_scenario_end_to_end() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let limiter = RateLimiter::builder(InMemoryLimitStore::new())
        .clock(clock.clone())
        .build();

    // Calls 1-5 allowed with remaining 4,3,2,1,0.
    for expected_remaining in [4, 3, 2, 1, 0] {
        let decision = limiter.check("203.0.113.7", "login").await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.remaining, expected_remaining);
    }

    // Call 6 denied with a 30 minute block.
    let denied = limiter.check("203.0.113.7", "login").await.unwrap();
    assert!(!denied.allowed);
    let blocked_until = denied.blocked_until.unwrap();
    assert_eq!(blocked_until, clock.now() + TimeDelta::minutes(30));

    // Call 7, ten minutes later, still inside the block.
    clock.advance(TimeDelta::minutes(10));
    let still_denied = limiter.check("203.0.113.7", "login").await.unwrap();
    assert!(!still_denied.allowed);
    assert_eq!(still_denied.blocked_until, Some(blocked_until));

    // After a successful login the handler resets; call 8 opens fresh.
    limiter.reset("203.0.113.7", "login").await.unwrap();
    let fresh = limiter.check("203.0.113.7", "login").await.unwrap();
    assert!(fresh.allowed);
    assert_eq!(fresh.remaining, 4);
}

#[tokio::test]
async fn enforce_raises_with_retry_after_metadata() {
    let (limiter, clock) = limiter();

    for _ in 0..3 {
        limiter.enforce("10.0.0.6", "tiny").await.unwrap();
    }

    let error = limiter.enforce("10.0.0.6", "tiny").await.unwrap_err();
    let Error::RateLimited(denied) = error else {
        panic!("expected a rate limit denial, got {error:?}");
    };
    assert_eq!(denied.retry_after, 300, "5 minute block in whole seconds");
    assert_eq!(denied.blocked_until, Some(clock.now() + TimeDelta::minutes(5)));
    // ISO-8601 rendering for the Retry-After response metadata.
    assert!(denied.reset_at_iso8601().starts_with(&format!(
        "{}",
        denied.reset_at.format("%Y-%m-%dT%H:%M:%S")
    )));
}

#[tokio::test]
async fn retry_after_rounds_partial_seconds_up() {
    let (limiter, clock) = limiter();

    for _ in 0..4 {
        let _ = limiter.check("10.0.0.9", "tiny").await.unwrap();
    }

    // 299.5s of block left must report 300, never 299: a client sleeping
    // retry_after seconds may not come back early.
    clock.advance(TimeDelta::milliseconds(500));
    let error = limiter.enforce("10.0.0.9", "tiny").await.unwrap_err();
    let Error::RateLimited(denied) = error else {
        panic!("expected a rate limit denial, got {error:?}");
    };
    assert_eq!(denied.retry_after, 300);
}

#[tokio::test]
async fn enforce_passes_allowed_decisions_through() {
    let (limiter, _clock) = limiter();
    let decision = limiter.enforce("10.0.0.7", "tiny").await.unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.remaining, 2);
}

#[tokio::test]
#[should_panic(expected = "unknown limit class")]
async fn unknown_class_is_a_configuration_bug() {
    let (limiter, _clock) = limiter();
    let _ = limiter.check("10.0.0.8", "no-such-class").await;
}

#[tokio::test]
async fn purge_drops_dead_entries_but_keeps_active_blocks() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let store = InMemoryLimitStore::new();
    let limiter = RateLimiter::builder(store.clone())
        .clock(clock.clone())
        .class(
            "tiny",
            LimitClass::new(3, TimeDelta::minutes(1), TimeDelta::minutes(5)),
        )
        .build();

    // One identifier just counts; another earns a block.
    limiter.check("counting", "tiny").await.unwrap();
    for _ in 0..4 {
        limiter.check("blocked", "tiny").await.unwrap();
    }
    assert_eq!(store.len(), 2);

    // Past the window but inside the block: only windows without a block die.
    clock.advance(TimeDelta::minutes(2));
    let removed = limiter.purge_dead().await.unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.len(), 1);

    // Past the block too: everything dies.
    clock.advance(TimeDelta::minutes(4));
    let removed = limiter.purge_dead().await.unwrap();
    assert_eq!(removed, 1);
    assert!(store.is_empty());
}
