#![warn(missing_docs)]
//! # gatebox-memory
//!
//! In-process implementations of the Gatebox storage traits, backed by
//! [`DashMap`](dashmap::DashMap).
//!
//! Both stores are cheap-to-clone handles around shared state, so the same
//! store can feed a service and a background sweeper.
//!
//! # Caveats
//!
//! - State is **not persisted** — everything resets on process restart.
//! - State is **not shared** across processes — each instance limits and
//!   caches independently. Horizontal scaling needs a networked store
//!   implementing the same traits.

mod cache;
mod limit;

pub use cache::InMemoryCacheStore;
pub use limit::InMemoryLimitStore;
