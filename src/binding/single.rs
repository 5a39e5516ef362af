//! Single-Resource Binding
//!
//! Exposes the load state of one `(resource, use_cache)` pair. A load cycle
//! starts on construction and again whenever the pair changes or `refetch` is
//! called. Must be created inside a tokio runtime.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use super::{BindingState, LoadCycle};
use crate::fetch::Payload;
use crate::loader::DataLoader;
use crate::resource::ResourceName;

/// Load state for one resource
pub struct ResourceBinding {
    loader: Arc<DataLoader>,
    cycle: Arc<LoadCycle<Payload>>,
    name: ResourceName,
    use_cache: bool,
}

impl ResourceBinding {
    /// Bind to a resource and start loading it
    pub fn new(loader: Arc<DataLoader>, name: ResourceName, use_cache: bool) -> Self {
        let binding = Self {
            loader,
            cycle: Arc::new(LoadCycle::new()),
            name,
            use_cache,
        };
        binding.start();
        binding
    }

    pub fn resource(&self) -> ResourceName {
        self.name
    }

    pub fn uses_cache(&self) -> bool {
        self.use_cache
    }

    /// Current state snapshot
    pub fn state(&self) -> BindingState<Payload> {
        self.cycle.snapshot()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<BindingState<Payload>> {
        self.cycle.subscribe()
    }

    /// Wait for the current cycle to settle
    pub async fn settled(&self) -> BindingState<Payload> {
        self.cycle.settled().await
    }

    /// Rebind to another resource or cache mode
    ///
    /// Starts a new cycle only when the pair actually changes. Returns whether
    /// a cycle was started.
    pub fn set_resource(&mut self, name: ResourceName, use_cache: bool) -> bool {
        if self.name == name && self.use_cache == use_cache {
            return false;
        }
        self.name = name;
        self.use_cache = use_cache;
        self.start();
        true
    }

    /// Reload from the source, bypassing any fresh cache entry
    pub fn refetch(&self) {
        if self.use_cache {
            self.loader.invalidate(self.name);
        }
        self.start();
    }

    fn start(&self) {
        let generation = self.cycle.begin();
        let loader = Arc::clone(&self.loader);
        let cycle = Arc::clone(&self.cycle);
        let name = self.name;
        let use_cache = self.use_cache;

        debug!(resource = %name, use_cache, generation, "Starting load");

        tokio::spawn(async move {
            let result = loader.fetch_with_policy(name, use_cache).await;
            if let Err(e) = &result {
                warn!(resource = %name, error = %e, "Load failed");
            }
            if !cycle.settle(generation, result.map_err(Arc::new)) {
                debug!(resource = %name, generation, "Discarding superseded load");
            }
        });
    }
}
