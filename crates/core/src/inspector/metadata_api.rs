//! HTTP torrent metadata backend.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::metrics::record_external_request;
use crate::searcher::TorrentCandidate;
use crate::transport::{build_client, decode_json, TransportError};

use super::{TorrentFileListing, TorrentInspector};

/// Metadata service response.
#[derive(Debug, Deserialize)]
struct MetadataResponse {
    data: TorrentFileListing,
}

/// Torrent metadata service client.
///
/// Posts `{"query": <magnet>}` to the configured URL and reads the file list.
pub struct MetadataApiInspector {
    client: Client,
    config: ServiceConfig,
}

impl MetadataApiInspector {
    pub fn new(config: ServiceConfig) -> Result<Self, TransportError> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            config,
        })
    }

    async fn fetch(&self, candidate: &TorrentCandidate) -> Result<TorrentFileListing, TransportError> {
        let response = self
            .client
            .post(&self.config.url)
            .json(&serde_json::json!({ "query": candidate.magnet }))
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;

        let metadata: MetadataResponse = decode_json(response).await?;
        Ok(metadata.data)
    }
}

#[async_trait]
impl TorrentInspector for MetadataApiInspector {
    fn name(&self) -> &str {
        "metadata_api"
    }

    async fn list_files(
        &self,
        candidate: &TorrentCandidate,
    ) -> Result<TorrentFileListing, TransportError> {
        let start = Instant::now();
        let result = self.fetch(candidate).await;
        record_external_request(self.name(), result.is_ok(), start.elapsed());

        let listing = result?;
        debug!(
            torrent = %candidate.title,
            files = listing.files.len(),
            "Fetched torrent metadata"
        );
        Ok(listing)
    }
}
