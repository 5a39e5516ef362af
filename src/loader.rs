//! Cached Fetch Coordinator
//!
//! Sits between bindings and the fetch primitive. Decides per call whether a
//! fresh cache entry can be trusted, writes successful fetches back to the
//! store, and never caches failures.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use futures_util::future::join_all;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::config::LoaderConfig;
use crate::fetch::{DataClient, Fetch, FetchCause, FetchError, Payload};
use crate::resource::{ResourceLocator, ResourceName};

/// Shared entry point for loading snapshots
///
/// One loader owns one cache store; bindings and prefetches share it through
/// an `Arc<DataLoader>`.
pub struct DataLoader {
    fetcher: Arc<dyn Fetch>,
    cache: CacheStore,
}

impl DataLoader {
    pub fn new(fetcher: Arc<dyn Fetch>, cache: CacheStore) -> Self {
        Self { fetcher, cache }
    }

    /// Build a loader backed by a `DataClient`
    pub fn from_config(config: &LoaderConfig) -> Result<Self> {
        let locator = ResourceLocator::new(config.source.clone());
        let client = DataClient::with_timeout(locator, config.request_timeout)?;
        let cache = CacheStore::with_ttl(config.cache_ttl);

        info!(
            source = %config.source,
            ttl_secs = cache.ttl().as_secs(),
            "Data loader ready"
        );
        Ok(Self::new(Arc::new(client), cache))
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Fetch a resource, consulting the cache when `use_cache` is set
    ///
    /// A bypassing read still writes its result through to the cache so later
    /// cached readers benefit from it.
    pub async fn fetch_with_policy(
        &self,
        name: ResourceName,
        use_cache: bool,
    ) -> Result<Payload, FetchError> {
        if use_cache {
            if let Some(payload) = self.cache.get_fresh(name) {
                return Ok(payload);
            }
        }

        let payload = self.fetcher.fetch_raw(name).await?;
        self.cache.put(name, Arc::clone(&payload));
        Ok(payload)
    }

    /// Cached load
    pub async fn load(&self, name: ResourceName) -> Result<Payload, FetchError> {
        self.fetch_with_policy(name, true).await
    }

    /// Cached load decoded into a caller type
    ///
    /// A decode failure leaves the cached JSON in place.
    pub async fn load_as<T: DeserializeOwned>(&self, name: ResourceName) -> Result<T, FetchError> {
        let payload = self.load(name).await?;
        <T as Deserialize>::deserialize(&*payload)
            .map_err(|e| FetchError::new(name, FetchCause::Decode(e)))
    }

    /// Warm the cache for resources likely to be needed next
    ///
    /// Runs in a detached task. Failures are logged and dropped; a failed name
    /// is simply left uncached. Awaiting the handle is optional.
    pub fn prefetch<I>(self: &Arc<Self>, names: I) -> JoinHandle<()>
    where
        I: IntoIterator<Item = ResourceName>,
    {
        let mut seen = HashSet::new();
        let names: Vec<ResourceName> = names.into_iter().filter(|n| seen.insert(*n)).collect();
        let loader = Arc::clone(self);

        tokio::spawn(async move {
            let loads = names.iter().map(|name| loader.load(*name));
            for result in join_all(loads).await {
                if let Err(e) = result {
                    debug!(resource = %e.resource(), error = %e, "Prefetch failed, ignoring");
                }
            }
            debug!(count = names.len(), "Prefetch finished");
        })
    }

    /// Drop one cached resource
    pub fn invalidate(&self, name: ResourceName) {
        self.cache.invalidate(name);
    }

    /// Drop every cached resource
    pub fn clear_all(&self) {
        self.cache.clear();
    }
}
