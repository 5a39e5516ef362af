//! Peskas data loader
//!
//! Loads the pre-computed JSON snapshots behind the Timor-Leste small-scale
//! fisheries dashboard, caches them for a fixed window, and exposes load
//! bindings with `{data, loading, error}` state plus refetch and prefetch.

pub mod binding;
pub mod cache;
pub mod config;
pub mod fetch;
pub mod loader;
pub mod resource;

#[cfg(test)]
pub(crate) mod testing;

pub use binding::{BindingState, MultiBinding, MultiPayload, ResourceBinding};
pub use cache::{CacheStats, CacheStore};
pub use config::LoaderConfig;
pub use fetch::{DataClient, Fetch, FetchCause, FetchError, Payload};
pub use loader::DataLoader;
pub use resource::{DataSource, ResourceLocator, ResourceName, UnknownResource};
