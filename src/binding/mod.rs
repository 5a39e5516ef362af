//! Load bindings
//!
//! A binding owns the `{data, loading, error}` state for one or more resources
//! and republishes it through a `watch` channel whenever a load cycle starts or
//! settles.
//!
//! Each cycle is stamped with a generation number. A settling load applies its
//! result only while its generation is still current, so a late response for a
//! superseded resource never overwrites the state of a newer cycle. Starting a
//! cycle and applying a result both happen under the channel's lock.

pub mod multi;
pub mod single;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::fetch::FetchError;

pub use multi::{MultiBinding, MultiPayload};
pub use single::ResourceBinding;

/// Observable state of a binding
#[derive(Debug, Clone)]
pub struct BindingState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<Arc<FetchError>>,
}

impl<T> BindingState<T> {
    /// Initial state of every cycle
    pub fn pending() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }

    pub fn ready(data: T) -> Self {
        Self {
            data: Some(data),
            loading: false,
            error: None,
        }
    }

    pub fn failed(error: Arc<FetchError>) -> Self {
        Self {
            data: None,
            loading: false,
            error: Some(error),
        }
    }

    pub fn is_settled(&self) -> bool {
        !self.loading
    }
}

impl<T> Default for BindingState<T> {
    fn default() -> Self {
        Self::pending()
    }
}

/// Generation-stamped state cell shared between a binding and its load tasks
pub(crate) struct LoadCycle<T> {
    state: watch::Sender<BindingState<T>>,
    generation: AtomicU64,
}

impl<T: Clone> LoadCycle<T> {
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(BindingState::pending());
        Self {
            state,
            generation: AtomicU64::new(0),
        }
    }

    /// Reset to the pending state and return the new current generation
    pub(crate) fn begin(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = BindingState::pending();
        });
        generation
    }

    /// Apply a result if `generation` is still current
    ///
    /// Returns false when the result was discarded.
    pub(crate) fn settle(&self, generation: u64, result: Result<T, Arc<FetchError>>) -> bool {
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = match result {
                Ok(data) => BindingState::ready(data),
                Err(error) => BindingState::failed(error),
            };
            true
        })
    }

    pub(crate) fn snapshot(&self) -> BindingState<T> {
        self.state.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<BindingState<T>> {
        self.state.subscribe()
    }

    /// Wait until the current cycle settles
    pub(crate) async fn settled(&self) -> BindingState<T> {
        let mut rx = self.state.subscribe();
        let state = match rx.wait_for(BindingState::is_settled).await {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        };
        state
    }
}
