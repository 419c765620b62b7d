//! Types for the torrent search system.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::transport::{nullable_vec, TransportError};

/// Which provider the torrent search is restricted to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderFilter {
    /// No restriction.
    #[default]
    All,
    /// Only this provider.
    Only(String),
}

impl ProviderFilter {
    /// `"all"` and the empty string mean no filter.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            ProviderFilter::All
        } else {
            ProviderFilter::Only(value.to_string())
        }
    }

    /// Path segment used by the torrent search service.
    pub fn as_str(&self) -> &str {
        match self {
            ProviderFilter::All => "all",
            ProviderFilter::Only(name) => name,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, ProviderFilter::All)
    }
}

impl fmt::Display for ProviderFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ProviderFilter {
    fn from(value: String) -> Self {
        ProviderFilter::parse(&value)
    }
}

impl From<ProviderFilter> for String {
    fn from(value: ProviderFilter) -> Self {
        value.as_str().to_string()
    }
}

/// Parameters for one torrent search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub provider: ProviderFilter,
    /// Free-text search term.
    pub term: String,
    /// Requested resolution (e.g. "720p").
    pub resolution: String,
}

/// A torrent release returned by the search service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TorrentCandidate {
    #[serde(default)]
    pub provider: String,
    /// Release kind as reported ("movie", "show", ...).
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub year: i32,
    /// Release group tag (e.g. "yts", "RARBG").
    #[serde(default)]
    pub group: String,
    /// Alternative releases of the same title.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub torrents: Vec<TorrentCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<i32>,
    #[serde(default)]
    pub resolution: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub codec: String,
    /// Source quality tag (e.g. "WEB", "BluRay").
    #[serde(default)]
    pub quality: String,
    #[serde(default)]
    pub seeds: u32,
    #[serde(default)]
    pub peers: u32,
    /// Human-readable size as reported by the service.
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub magnet: String,
}

/// Trait for torrent search backends.
#[async_trait]
pub trait TorrentSearch: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Search releases for a title.
    async fn search(&self, filter: &SearchFilter) -> Result<Vec<TorrentCandidate>, TransportError>;
}
