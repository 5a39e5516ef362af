//! Resource names
//!
//! The dashboard only ever reads a fixed set of pre-computed snapshots.
//! Anything outside that set is a caller bug, so it is rejected at parse time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A logical data snapshot published for the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceName {
    /// Catch and revenue aggregated by time bin
    Aggregated,
    /// Headline figures for the landing page
    SummaryData,
    /// Catch composition by taxa
    TaxaAggregated,
    /// Catch and revenue by municipality
    MunicipalAggregated,
    /// Vessel-tracking density predictions
    PredictedTracks,
}

/// Error for a name outside the known resource set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown resource: {0}")]
pub struct UnknownResource(pub String);

impl ResourceName {
    /// Every known resource, in publication order
    pub const ALL: [ResourceName; 5] = [
        ResourceName::Aggregated,
        ResourceName::SummaryData,
        ResourceName::TaxaAggregated,
        ResourceName::MunicipalAggregated,
        ResourceName::PredictedTracks,
    ];

    /// Wire name, also the file stem of the snapshot
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceName::Aggregated => "aggregated",
            ResourceName::SummaryData => "summary_data",
            ResourceName::TaxaAggregated => "taxa_aggregated",
            ResourceName::MunicipalAggregated => "municipal_aggregated",
            ResourceName::PredictedTracks => "predicted_tracks",
        }
    }

    /// File name of the snapshot (`<name>.json`)
    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceName {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}
