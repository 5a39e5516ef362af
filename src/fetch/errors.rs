//! Fetch Error Types
//!
//! Every transport or parse problem is wrapped into one `FetchError` that
//! names the resource and keeps the original cause for diagnostics.

use crate::resource::ResourceName;

/// Underlying reason a fetch failed
#[derive(Debug, thiserror::Error)]
pub enum FetchCause {
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Request timeout")]
    Timeout,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server error ({0}): {1}")]
    Server(u16, String),

    #[error("HTTP {0}: {1}")]
    Status(u16, String),

    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Unexpected payload shape: {0}")]
    Decode(#[source] serde_json::Error),
}

impl FetchCause {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            404 => FetchCause::NotFound(body.to_string()),
            408 => FetchCause::Timeout,
            500..=599 => FetchCause::Server(status, body.to_string()),
            _ => FetchCause::Status(status, body.to_string()),
        }
    }

    /// Classify a reqwest failure raised before a status was seen
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchCause::Timeout
        } else {
            FetchCause::Network(err)
        }
    }

    /// Classify a local read failure
    pub fn from_io(err: std::io::Error, location: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FetchCause::NotFound(location.to_string()),
            std::io::ErrorKind::TimedOut => FetchCause::Timeout,
            _ => FetchCause::Io(err),
        }
    }
}

/// A failed fetch of one resource
#[derive(Debug, thiserror::Error)]
#[error("Failed to fetch {resource}: {cause}")]
pub struct FetchError {
    resource: ResourceName,
    #[source]
    cause: FetchCause,
}

impl FetchError {
    pub fn new(resource: ResourceName, cause: FetchCause) -> Self {
        Self { resource, cause }
    }

    /// The resource that failed to load
    pub fn resource(&self) -> ResourceName {
        self.resource
    }

    pub fn cause(&self) -> &FetchCause {
        &self.cause
    }

    /// Whether the failure happened below the JSON layer
    pub fn is_transport(&self) -> bool {
        !self.is_parse()
    }

    /// Whether the body arrived but was not usable JSON
    pub fn is_parse(&self) -> bool {
        matches!(self.cause, FetchCause::Parse(_) | FetchCause::Decode(_))
    }
}
