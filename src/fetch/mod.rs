//! Fetch primitive
//!
//! One fetch of one named snapshot, parsed as JSON. No caching, no retries.

pub mod client;
pub mod errors;

use std::sync::Arc;

use async_trait::async_trait;

use crate::resource::ResourceName;

pub use client::DataClient;
pub use errors::{FetchCause, FetchError};

/// Parsed snapshot body, shared between the cache and every reader
pub type Payload = Arc<serde_json::Value>;

/// Source of raw snapshot payloads
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch and parse one resource
    async fn fetch_raw(&self, name: ResourceName) -> Result<Payload, FetchError>;
}
