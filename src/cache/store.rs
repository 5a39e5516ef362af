//! Snapshot Cache Store
//!
//! Keyed store of parsed snapshots with a single store-wide TTL.
//! Staleness is computed at read time from the fetch timestamp; entries are
//! never marked stale in place, so a stale entry stays readable through `get`
//! until it is overwritten, invalidated, or cleared.
//!
//! The key space is the closed `ResourceName` set, so the store is never
//! capacity bound and moka never evicts a live snapshot.
//!
//! Timestamps come from tokio's clock, which tests can pause and advance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::sync::Cache;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::fetch::Payload;
use crate::resource::ResourceName;

/// Default time-to-live for snapshots (5 minutes)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Whether an entry fetched at `fetched_at` is still fresh at `now`
pub fn is_fresh(fetched_at: Instant, now: Instant, ttl: Duration) -> bool {
    now.saturating_duration_since(fetched_at) < ttl
}

/// Stored snapshot with its fetch time
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub resource: ResourceName,
    pub payload: Payload,
    pub fetched_at: Instant,
}

impl CacheEntry {
    pub fn is_fresh_at(&self, now: Instant, ttl: Duration) -> bool {
        is_fresh(self.fetched_at, now, ttl)
    }
}

/// Point-in-time cache counters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Percentage of fresh reads, 0.0 when nothing was read yet
    pub hit_rate: f64,
    pub entries: u64,
}

/// Shared snapshot cache
pub struct CacheStore {
    /// Snapshots by resource name
    entries: Cache<ResourceName, CacheEntry>,
    /// Freshness window
    ttl: Duration,
    /// Fresh read counter
    hits: AtomicU64,
    /// Absent or stale read counter
    misses: AtomicU64,
}

impl CacheStore {
    /// Create a store with the default TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    /// Create a store with a custom TTL
    ///
    /// # Arguments
    /// * `ttl` - Freshness window applied to every entry
    pub fn with_ttl(ttl: Duration) -> Self {
        let entries = Cache::builder()
            .initial_capacity(ResourceName::ALL.len())
            .name("snapshot_cache")
            .build();

        Self {
            entries,
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get the stored entry regardless of freshness
    pub fn get(&self, name: ResourceName) -> Option<CacheEntry> {
        self.entries.get(&name)
    }

    /// Get the payload only if the entry is still fresh
    ///
    /// Updates hit/miss counters.
    pub fn get_fresh(&self, name: ResourceName) -> Option<Payload> {
        let now = Instant::now();
        match self.entries.get(&name) {
            Some(entry) if entry.is_fresh_at(now, self.ttl) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(resource = %name, "Cache HIT");
                Some(entry.payload)
            }
            Some(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!(resource = %name, "Cache STALE");
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!(resource = %name, "Cache MISS");
                None
            }
        }
    }

    /// Store a payload stamped with the current time, replacing any prior entry
    pub fn put(&self, name: ResourceName, payload: Payload) {
        let entry = CacheEntry {
            resource: name,
            payload,
            fetched_at: Instant::now(),
        };
        self.entries.insert(name, entry);
        debug!(resource = %name, "Cached snapshot");
    }

    /// Remove one entry
    pub fn invalidate(&self, name: ResourceName) {
        self.entries.invalidate(&name);
        debug!(resource = %name, "Invalidated cached snapshot");
    }

    /// Remove every entry and reset counters
    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        debug!("Cleared snapshot cache");
    }

    /// Names currently holding an entry, fresh or not
    pub fn cached_names(&self) -> Vec<ResourceName> {
        ResourceName::ALL
            .into_iter()
            .filter(|name| self.entries.contains_key(name))
            .collect()
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        self.entries.run_pending_tasks();
        CacheStats {
            hits,
            misses,
            hit_rate,
            entries: self.entries.entry_count(),
        }
    }

    /// Log current cache metrics
    pub fn log_metrics(&self) {
        let stats = self.stats();
        debug!(
            hits = stats.hits,
            misses = stats.misses,
            hit_rate = format!("{:.1}%", stats.hit_rate),
            entries = stats.entries,
            "Cache metrics"
        );
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}
