//! Scripted fetch double for loader and binding tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::fetch::{Fetch, FetchCause, FetchError, Payload};
use crate::resource::ResourceName;

#[derive(Clone)]
enum Outcome {
    Ok(serde_json::Value),
    Fail(u16),
}

/// Answers each resource with a scripted outcome and counts calls
///
/// Every successful call returns a fresh `Arc`, so pointer equality tells a
/// cached read apart from a new fetch. A held resource blocks until released.
#[derive(Default)]
pub struct ScriptedFetcher {
    outcomes: Mutex<HashMap<ResourceName, Outcome>>,
    calls: Mutex<HashMap<ResourceName, usize>>,
    gates: Mutex<HashMap<ResourceName, Arc<Semaphore>>>,
}

impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, name: ResourceName, value: serde_json::Value) {
        self.outcomes.lock().unwrap().insert(name, Outcome::Ok(value));
    }

    pub fn fail(&self, name: ResourceName, status: u16) {
        self.outcomes.lock().unwrap().insert(name, Outcome::Fail(status));
    }

    /// Make subsequent fetches of `name` wait for `release`
    pub fn hold(&self, name: ResourceName) {
        self.gates
            .lock()
            .unwrap()
            .insert(name, Arc::new(Semaphore::new(0)));
    }

    /// Let one waiting fetch of `name` proceed
    pub fn release(&self, name: ResourceName) {
        if let Some(gate) = self.gates.lock().unwrap().get(&name) {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self, name: ResourceName) -> usize {
        self.calls.lock().unwrap().get(&name).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Fetch for ScriptedFetcher {
    async fn fetch_raw(&self, name: ResourceName) -> Result<Payload, FetchError> {
        *self.calls.lock().unwrap().entry(name).or_insert(0) += 1;

        let gate = self.gates.lock().unwrap().get(&name).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        // Read the outcome after the gate so a held fetch sees the latest script
        let outcome = self.outcomes.lock().unwrap().get(&name).cloned();
        match outcome {
            Some(Outcome::Ok(value)) => Ok(Arc::new(value)),
            Some(Outcome::Fail(status)) => Err(FetchError::new(
                name,
                FetchCause::from_status(status, "scripted failure"),
            )),
            None => Err(FetchError::new(
                name,
                FetchCause::NotFound(name.file_name()),
            )),
        }
    }
}
