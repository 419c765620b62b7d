//! Types for torrent file listings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::searcher::TorrentCandidate;
use crate::transport::{nullable_vec, TransportError};

/// A file inside a torrent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedFile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub size: u64,
}

/// File listing and swarm info of one torrent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentFileListing {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "infoHash")]
    pub info_hash: String,
    #[serde(default, rename = "magnetURI")]
    pub magnet_uri: String,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub announce: Vec<String>,
    #[serde(default)]
    pub seeds: u32,
    #[serde(default)]
    pub peers: u32,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub files: Vec<ListedFile>,
}

impl TorrentFileListing {
    /// Listing with just the given file names (tests and fixtures).
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: names
                .into_iter()
                .map(|n| {
                    let name = n.into();
                    ListedFile {
                        path: name.clone(),
                        name,
                        size: 0,
                    }
                })
                .collect(),
            ..Default::default()
        }
    }
}

/// Trait for torrent metadata backends.
#[async_trait]
pub trait TorrentInspector: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Fetch the file listing of a candidate.
    async fn list_files(
        &self,
        candidate: &TorrentCandidate,
    ) -> Result<TorrentFileListing, TransportError>;
}
