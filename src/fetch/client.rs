//! Snapshot Client
//!
//! Fetches `<name>.json` from the configured data source, over HTTP or from a
//! local snapshot directory, and parses the body as JSON.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use super::errors::{FetchCause, FetchError};
use super::{Fetch, Payload};
use crate::resource::{Location, ResourceLocator, ResourceName};

/// HTTP client timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for pre-computed dashboard snapshots
#[derive(Clone)]
pub struct DataClient {
    /// HTTP client for remote sources
    http_client: Client,
    /// Maps names to snapshot locations
    locator: ResourceLocator,
}

impl DataClient {
    /// Create a client with the default request timeout
    pub fn new(locator: ResourceLocator) -> Result<Self> {
        Self::with_timeout(locator, REQUEST_TIMEOUT)
    }

    /// Create a client with a custom request timeout
    pub fn with_timeout(locator: ResourceLocator, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            locator,
        })
    }

    /// Read raw bytes for a location
    async fn read_bytes(&self, name: ResourceName, location: &Location) -> Result<Vec<u8>, FetchError> {
        match location {
            Location::Url(url) => {
                let response = self
                    .http_client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| FetchError::new(name, FetchCause::from_reqwest(e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(FetchError::new(
                        name,
                        FetchCause::from_status(status.as_u16(), &body),
                    ));
                }

                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| FetchError::new(name, FetchCause::from_reqwest(e)))?;
                Ok(bytes.to_vec())
            }
            Location::Path(path) => tokio::fs::read(path).await.map_err(|e| {
                FetchError::new(name, FetchCause::from_io(e, &path.display().to_string()))
            }),
        }
    }
}

#[async_trait]
impl Fetch for DataClient {
    async fn fetch_raw(&self, name: ResourceName) -> Result<Payload, FetchError> {
        let location = self.locator.locate(name);
        debug!(resource = %name, location = %location, "Fetching snapshot");

        let bytes = self.read_bytes(name, &location).await?;

        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| FetchError::new(name, FetchCause::Parse(e)))?;

        info!(resource = %name, size = bytes.len(), "Fetched snapshot");
        Ok(Arc::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::DataSource;
    use std::fs;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn directory_client(dir: &std::path::Path) -> DataClient {
        let locator = ResourceLocator::new(DataSource::Directory(dir.to_path_buf()));
        DataClient::new(locator).unwrap()
    }

    /// Serve one canned HTTP response on a loopback port
    async fn serve_once(status_line: &'static str, body: &'static str) -> DataClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        let source = DataSource::parse(&format!("http://{}/data", addr)).unwrap();
        DataClient::with_timeout(ResourceLocator::new(source), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_over_http() {
        let client = serve_once(
            "200 OK",
            r#"{"month":[{"date_bin_start":"2024-01-01","catch":1000}]}"#,
        )
        .await;

        let payload = client.fetch_raw(ResourceName::Aggregated).await.unwrap();
        assert_eq!(payload["month"][0]["catch"], 1000);
    }

    #[tokio::test]
    async fn test_http_error_status_is_server_error() {
        let client = serve_once("503 Service Unavailable", "maintenance").await;

        let err = client.fetch_raw(ResourceName::SummaryData).await.unwrap_err();
        assert_eq!(err.resource(), ResourceName::SummaryData);
        assert!(err.is_transport());
        assert!(matches!(err.cause(), FetchCause::Server(503, _)));
    }

    #[tokio::test]
    async fn test_http_missing_snapshot_is_not_found() {
        let client = serve_once("404 Not Found", "").await;

        let err = client.fetch_raw(ResourceName::PredictedTracks).await.unwrap_err();
        assert!(matches!(err.cause(), FetchCause::NotFound(_)));
    }

    #[tokio::test]
    async fn test_http_invalid_json_is_parse_error() {
        let client = serve_once("200 OK", "{bad").await;

        let err = client.fetch_raw(ResourceName::TaxaAggregated).await.unwrap_err();
        assert!(err.is_parse());
        assert!(matches!(err.cause(), FetchCause::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("aggregated.json"),
            r#"{"month":[{"date_bin_start":"2024-01-01","catch":1000}]}"#,
        )
        .unwrap();

        let client = directory_client(dir.path());
        let payload = client.fetch_raw(ResourceName::Aggregated).await.unwrap();

        assert_eq!(payload["month"][0]["catch"], 1000);
        assert_eq!(payload["month"][0]["date_bin_start"], "2024-01-01");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let client = directory_client(dir.path());

        let err = client.fetch_raw(ResourceName::PredictedTracks).await.unwrap_err();
        assert_eq!(err.resource(), ResourceName::PredictedTracks);
        assert!(err.is_transport());
        assert!(matches!(err.cause(), FetchCause::NotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("summary_data.json"), "{\"catch\": ").unwrap();

        let client = directory_client(dir.path());
        let err = client.fetch_raw(ResourceName::SummaryData).await.unwrap_err();

        assert!(err.is_parse());
        assert!(matches!(err.cause(), FetchCause::Parse(_)));
    }

    #[tokio::test]
    async fn test_payload_shape_is_not_validated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("taxa_aggregated.json"), "[1, 2, 3]").unwrap();

        let client = directory_client(dir.path());
        let payload = client.fetch_raw(ResourceName::TaxaAggregated).await.unwrap();
        assert_eq!(payload.as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn test_unreachable_http_source_is_network_error() {
        // Bind then drop a listener so the port is known to be closed
        let addr = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap()
            .local_addr()
            .unwrap();
        let source = DataSource::parse(&format!("http://{}/data", addr)).unwrap();
        let locator = ResourceLocator::new(source);
        let client = DataClient::with_timeout(locator, Duration::from_secs(2)).unwrap();

        let err = client.fetch_raw(ResourceName::Aggregated).await.unwrap_err();
        assert!(err.is_transport());
        assert!(matches!(
            err.cause(),
            FetchCause::Network(_) | FetchCause::Timeout
        ));
    }
}
