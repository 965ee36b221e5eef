#![warn(missing_docs)]
//! # gatebox-core
//!
//! Core traits and types for the Gatebox rate-limiting and caching toolkit.
//!
//! This crate provides the foundational abstractions that keep Gatebox
//! **storage-agnostic**: the services in the `gatebox` crate only talk to the
//! [`LimitStore`] and [`CacheStore`] traits defined here, so the bundled
//! in-process stores (`gatebox-memory`) can later be replaced by a networked
//! backend without touching the public service contracts.
//!
//! ## What lives here
//!
//! - **Limit state** — [`LimitClass`], [`LimitKey`], [`LimitEntry`], and
//!   [`LimitDecision`] model a truncating sliding window with a cooldown
//!   block once the window's quota is exceeded.
//! - **Cache state** — [`CacheKey`], [`CacheValue`], [`CachePolicy`], and
//!   [`CacheStats`] model tag-indexed entries with absolute expiry.
//! - **Storage seams** — [`LimitStore`] and [`CacheStore`] with the shared
//!   [`StoreError`] taxonomy.
//! - **Time** — the [`Clock`] trait with a wall-clock implementation and a
//!   manually driven one for deterministic tests.

pub mod clock;
pub mod key;
pub mod limit;
pub mod policy;
pub mod store;
pub mod value;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{CacheKey, CacheKeyBuilder};
pub use limit::{LimitClass, LimitDecision, LimitEntry, LimitKey};
pub use policy::CachePolicy;
pub use store::{CacheStore, DeleteStatus, LimitStore, StoreError, StoreResult};
pub use value::{CacheStats, CacheValue};

/// Raw byte data type used for serialized cache values.
/// Using `Bytes` keeps clones cheap via reference counting.
pub type Raw = bytes::Bytes;
