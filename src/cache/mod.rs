//! Snapshot caching layer
//!
//! Process-wide store of parsed snapshots with a single TTL. Owned by the
//! loader and injected, so tests build isolated instances.

pub mod store;

pub use store::{is_fresh, CacheEntry, CacheStats, CacheStore, DEFAULT_CACHE_TTL};
