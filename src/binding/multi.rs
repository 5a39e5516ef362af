//! Multi-Resource Binding
//!
//! Loads a set of resources in parallel, always through the cache, and
//! reports them as one unit: data only when every load succeeds, otherwise the
//! first failure to complete.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::{BindingState, LoadCycle};
use crate::fetch::{FetchError, Payload};
use crate::loader::DataLoader;
use crate::resource::ResourceName;

/// Payloads of a fully loaded set, keyed by resource
pub type MultiPayload = HashMap<ResourceName, Payload>;

/// Load state for several resources at once
pub struct MultiBinding {
    loader: Arc<DataLoader>,
    cycle: Arc<LoadCycle<MultiPayload>>,
    names: Vec<ResourceName>,
}

impl MultiBinding {
    /// Bind to a set of resources and start loading them
    ///
    /// Duplicate names are dropped, keeping the first occurrence.
    pub fn new<I>(loader: Arc<DataLoader>, names: I) -> Self
    where
        I: IntoIterator<Item = ResourceName>,
    {
        let binding = Self {
            loader,
            cycle: Arc::new(LoadCycle::new()),
            names: dedup(names),
        };
        binding.start();
        binding
    }

    pub fn resources(&self) -> &[ResourceName] {
        &self.names
    }

    pub fn state(&self) -> BindingState<MultiPayload> {
        self.cycle.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<BindingState<MultiPayload>> {
        self.cycle.subscribe()
    }

    pub async fn settled(&self) -> BindingState<MultiPayload> {
        self.cycle.settled().await
    }

    /// Rebind to another set of resources
    ///
    /// Returns whether a new cycle was started.
    pub fn set_resources<I>(&mut self, names: I) -> bool
    where
        I: IntoIterator<Item = ResourceName>,
    {
        let names = dedup(names);
        if names == self.names {
            return false;
        }
        self.names = names;
        self.start();
        true
    }

    /// Invalidate every bound resource and reload the set
    pub fn refetch(&self) {
        for name in &self.names {
            self.loader.invalidate(*name);
        }
        self.start();
    }

    fn start(&self) {
        let generation = self.cycle.begin();
        let loader = Arc::clone(&self.loader);
        let cycle = Arc::clone(&self.cycle);
        let names = self.names.clone();

        debug!(count = names.len(), generation, "Starting multi-resource load");

        tokio::spawn(async move {
            let result = load_all(&loader, &names).await;
            if let Err(e) = &result {
                warn!(resource = %e.resource(), error = %e, "Multi-resource load failed");
            }
            if !cycle.settle(generation, result) {
                debug!(generation, "Discarding superseded multi-resource load");
            }
        });
    }
}

/// Run every load to completion; keep the first failure by completion order
async fn load_all(
    loader: &DataLoader,
    names: &[ResourceName],
) -> Result<MultiPayload, Arc<FetchError>> {
    let mut pending: FuturesUnordered<_> = names
        .iter()
        .map(|name| async move { (*name, loader.load(*name).await) })
        .collect();

    let mut data = MultiPayload::with_capacity(names.len());
    let mut first_error: Option<FetchError> = None;

    while let Some((name, result)) = pending.next().await {
        match result {
            Ok(payload) => {
                data.insert(name, payload);
            }
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e);
                } else {
                    debug!(resource = %name, error = %e, "Additional failure in multi-resource load");
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(Arc::new(e)),
        None => Ok(data),
    }
}

fn dedup<I>(names: I) -> Vec<ResourceName>
where
    I: IntoIterator<Item = ResourceName>,
{
    let mut seen = HashSet::new();
    names.into_iter().filter(|name| seen.insert(*name)).collect()
}
