//! Store-level contract tests for the in-memory backends.

use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use smol_str::SmolStr;

use gatebox_core::store::{CacheStore, DeleteStatus, LimitStore};
use gatebox_core::{CacheKey, CacheValue, LimitEntry, LimitKey};
use gatebox_memory::{InMemoryCacheStore, InMemoryLimitStore};

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
}

fn value(expires_at: DateTime<Utc>, tags: &[&str]) -> CacheValue<Bytes> {
    CacheValue::new(
        Bytes::from_static(b"{}"),
        expires_at,
        tags.iter().map(|tag| SmolStr::new(tag)).collect(),
    )
}

#[tokio::test]
async fn limit_store_round_trips_entries() {
    let store = InMemoryLimitStore::new();
    let key = LimitKey::new("login", "203.0.113.7");

    assert_eq!(store.load(&key).await.unwrap(), None);

    let entry = LimitEntry::fresh(at(0), TimeDelta::minutes(15));
    store.save(key.clone(), entry.clone()).await.unwrap();
    assert_eq!(store.load(&key).await.unwrap(), Some(entry));

    assert_eq!(store.remove(&key).await.unwrap(), DeleteStatus::Deleted(1));
    assert_eq!(store.remove(&key).await.unwrap(), DeleteStatus::Missing);
}

#[tokio::test]
async fn limit_store_save_replaces_in_place() {
    let store = InMemoryLimitStore::new();
    let key = LimitKey::new("api", "user-9");

    let mut entry = LimitEntry::fresh(at(0), TimeDelta::minutes(1));
    store.save(key.clone(), entry.clone()).await.unwrap();
    entry.count = 3;
    store.save(key.clone(), entry.clone()).await.unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.load(&key).await.unwrap().unwrap().count, 3);
}

#[tokio::test]
async fn limit_purge_respects_active_blocks() {
    let store = InMemoryLimitStore::new();

    let expired = LimitEntry::fresh(at(0), TimeDelta::seconds(60));
    let mut blocked = LimitEntry::fresh(at(0), TimeDelta::seconds(60));
    blocked.blocked_until = Some(at(600));
    store
        .save(LimitKey::new("login", "expired"), expired)
        .await
        .unwrap();
    store
        .save(LimitKey::new("login", "blocked"), blocked)
        .await
        .unwrap();

    // Window elapsed for both, but the block keeps its entry alive.
    assert_eq!(store.purge(at(120)).await.unwrap(), 1);
    assert_eq!(store.len(), 1);

    assert_eq!(store.purge(at(600)).await.unwrap(), 1);
    assert!(store.is_empty());
}

#[tokio::test]
async fn cache_store_round_trips_values() {
    let store = InMemoryCacheStore::new();
    let key = CacheKey::new("tickets");

    assert!(store.read(&key).await.unwrap().is_none());

    let stored = value(at(60), &["tickets"]);
    store.write(key.clone(), stored.clone()).await.unwrap();
    assert_eq!(store.read(&key).await.unwrap(), Some(stored));

    assert_eq!(store.remove(&key).await.unwrap(), DeleteStatus::Deleted(1));
    assert_eq!(store.remove(&key).await.unwrap(), DeleteStatus::Missing);
}

#[tokio::test]
async fn tag_removal_counts_only_matching_entries() {
    let store = InMemoryCacheStore::new();
    store
        .write(CacheKey::new("a"), value(at(60), &["x"]))
        .await
        .unwrap();
    store
        .write(CacheKey::new("b"), value(at(60), &["x", "y"]))
        .await
        .unwrap();
    store
        .write(CacheKey::new("c"), value(at(60), &["y"]))
        .await
        .unwrap();

    assert_eq!(store.remove_by_tag("x").await.unwrap(), 2);
    assert_eq!(store.remove_by_tag("x").await.unwrap(), 0);
    assert_eq!(store.len(), 1);
    assert!(store.read(&CacheKey::new("c")).await.unwrap().is_some());
}

#[tokio::test]
async fn clear_reports_how_much_it_dropped() {
    let store = InMemoryCacheStore::new();
    store
        .write(CacheKey::new("a"), value(at(60), &[]))
        .await
        .unwrap();
    store
        .write(CacheKey::new("b"), value(at(60), &[]))
        .await
        .unwrap();

    assert_eq!(store.clear().await.unwrap(), 2);
    assert_eq!(store.clear().await.unwrap(), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn purge_and_stats_split_on_expiry() {
    let store = InMemoryCacheStore::new();
    store
        .write(CacheKey::new("stale"), value(at(10), &[]))
        .await
        .unwrap();
    store
        .write(CacheKey::new("fresh"), value(at(600), &[]))
        .await
        .unwrap();

    let stats = store.stats(at(10)).await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.active, 1);
    assert_eq!(stats.expired, 1);

    assert_eq!(store.purge_expired(at(10)).await.unwrap(), 1);
    let stats = store.stats(at(10)).await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.expired, 0);
}

#[tokio::test]
async fn clones_share_the_same_map() {
    let store = InMemoryCacheStore::new();
    let handle = store.clone();

    handle
        .write(CacheKey::new("shared"), value(at(60), &[]))
        .await
        .unwrap();
    assert!(store.read(&CacheKey::new("shared")).await.unwrap().is_some());
}
