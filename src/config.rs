//! Loader configuration
//!
//! Defaults match the dashboard deployment: snapshots under `/data`, a
//! 5 minute cache window and the daemon-wide 30 second request timeout.
//! Every value can be overridden from the environment.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::cache::DEFAULT_CACHE_TTL;
use crate::fetch::client::REQUEST_TIMEOUT;
use crate::resource::DataSource;

pub const ENV_DATA_SOURCE: &str = "PESKAS_DATA_SOURCE";
pub const ENV_CACHE_TTL_SECS: &str = "PESKAS_CACHE_TTL_SECS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "PESKAS_REQUEST_TIMEOUT_SECS";

/// Settings for building a `DataLoader`
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Where snapshots are read from
    pub source: DataSource,
    /// Freshness window for cached snapshots
    pub cache_ttl: Duration,
    /// Transport timeout for a single fetch
    pub request_timeout: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            source: DataSource::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: DataSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Build from key/value pairs, ignoring unrelated keys
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        let mut config = Self::default();

        if let Some(raw) = vars.get(ENV_DATA_SOURCE) {
            config.source = DataSource::parse(raw)
                .with_context(|| format!("Invalid {}", ENV_DATA_SOURCE))?;
        }
        if let Some(secs) = parse_u64(&vars, ENV_CACHE_TTL_SECS)? {
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_u64(&vars, ENV_REQUEST_TIMEOUT_SECS)? {
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_u64(vars: &HashMap<String, String>, key: &str) -> Result<Option<u64>> {
    vars.get(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid {}: '{}'", key, raw))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::from_vars(Vec::new()).unwrap();
        assert_eq!(config.source, DataSource::Directory(PathBuf::from("/data")));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = LoaderConfig::from_vars(vars(&[
            (ENV_DATA_SOURCE, "https://peskas.example.org/data"),
            (ENV_CACHE_TTL_SECS, "60"),
            (ENV_REQUEST_TIMEOUT_SECS, " 5 "),
            ("HOME", "/root"),
        ]))
        .unwrap();

        assert_eq!(
            config.source,
            DataSource::Http("https://peskas.example.org/data".to_string())
        );
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_number_is_error() {
        let err = LoaderConfig::from_vars(vars(&[(ENV_CACHE_TTL_SECS, "five")])).unwrap_err();
        assert!(err.to_string().contains(ENV_CACHE_TTL_SECS));
    }

    #[test]
    fn test_builder() {
        let config = LoaderConfig::new()
            .with_ttl(Duration::ZERO)
            .with_request_timeout(Duration::from_secs(1));
        assert_eq!(config.cache_ttl, Duration::ZERO);
        assert_eq!(config.request_timeout, Duration::from_secs(1));
    }
}
