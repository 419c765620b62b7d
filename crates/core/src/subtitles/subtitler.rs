//! HTTP subtitle search backend.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::metrics::record_external_request;
use crate::transport::{build_client, decode_json, ListEnvelope, TransportError};

use super::{SubtitleCandidate, SubtitleSearch};

/// Subtitle search service client (`GET {url}?term=..`).
pub struct SubtitlerApiClient {
    client: Client,
    config: ServiceConfig,
}

impl SubtitlerApiClient {
    pub fn new(config: ServiceConfig) -> Result<Self, TransportError> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            config,
        })
    }

    async fn fetch(&self, title: &str) -> Result<Vec<SubtitleCandidate>, TransportError> {
        let response = self
            .client
            .get(&self.config.url)
            .header("Content-Type", "application/json")
            .query(&[("term", title)])
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;

        let envelope: ListEnvelope<SubtitleCandidate> = decode_json(response).await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl SubtitleSearch for SubtitlerApiClient {
    fn name(&self) -> &str {
        "subtitle_api"
    }

    async fn search(&self, title: &str) -> Result<Vec<SubtitleCandidate>, TransportError> {
        let start = Instant::now();
        let result = self.fetch(title).await;
        record_external_request(self.name(), result.is_ok(), start.elapsed());

        let subtitles = result?;
        debug!(title = %title, results = subtitles.len(), "Subtitle search complete");
        Ok(subtitles)
    }
}
