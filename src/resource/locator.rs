//! Resource Locator
//!
//! Resolves a resource name to `{BASE}/{name}.json`, where the base is either
//! an HTTP(S) prefix or a local snapshot directory.

use std::fmt;
use std::path::PathBuf;

use reqwest::Url;

use super::name::ResourceName;

/// Default base path for snapshots
pub const DEFAULT_BASE_PATH: &str = "/data";

/// Error for a base that cannot be used as a data source
#[derive(Debug, Clone, thiserror::Error)]
#[error("Invalid data source '{source_str}': {reason}")]
pub struct InvalidSource {
    source_str: String,
    reason: String,
}

/// Where snapshots are served from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Remote base URL, without trailing slash
    Http(String),
    /// Local directory holding `<name>.json` files
    Directory(PathBuf),
}

impl DataSource {
    /// Parse a base location
    ///
    /// `http://` and `https://` prefixes select the HTTP transport; anything else
    /// is taken as a directory path.
    pub fn parse(raw: &str) -> Result<Self, InvalidSource> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidSource {
                source_str: raw.to_string(),
                reason: "empty base".to_string(),
            });
        }

        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            let base = trimmed.trim_end_matches('/');
            Url::parse(base).map_err(|e| InvalidSource {
                source_str: raw.to_string(),
                reason: e.to_string(),
            })?;
            return Ok(DataSource::Http(base.to_string()));
        }

        Ok(DataSource::Directory(PathBuf::from(trimmed)))
    }
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Directory(PathBuf::from(DEFAULT_BASE_PATH))
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Http(base) => f.write_str(base),
            DataSource::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

/// Resolved location of one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Url(String),
    Path(PathBuf),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Url(url) => f.write_str(url),
            Location::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Maps resource names onto a fixed data source
#[derive(Debug, Clone)]
pub struct ResourceLocator {
    source: DataSource,
}

impl ResourceLocator {
    pub fn new(source: DataSource) -> Self {
        Self { source }
    }

    /// Resolve a resource to its snapshot location
    pub fn locate(&self, name: ResourceName) -> Location {
        match &self.source {
            DataSource::Http(base) => Location::Url(format!("{}/{}", base, name.file_name())),
            DataSource::Directory(dir) => Location::Path(dir.join(name.file_name())),
        }
    }
}
