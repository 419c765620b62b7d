//! HTTP torrent search backend.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::metrics::record_external_request;
use crate::transport::{build_client, decode_json, ListEnvelope, TransportError};

use super::{SearchFilter, TorrentCandidate, TorrentSearch};

/// Torrent search service client.
///
/// Queries `GET {url}/{provider}/?term=..&res=..`.
pub struct TorrentApiSearcher {
    client: Client,
    config: ServiceConfig,
}

impl TorrentApiSearcher {
    pub fn new(config: ServiceConfig) -> Result<Self, TransportError> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            config,
        })
    }

    fn build_search_url(&self, filter: &SearchFilter) -> String {
        format!(
            "{}/{}/",
            self.config.url.trim_end_matches('/'),
            urlencoding::encode(filter.provider.as_str())
        )
    }

    async fn fetch(&self, filter: &SearchFilter) -> Result<Vec<TorrentCandidate>, TransportError> {
        let url = self.build_search_url(filter);
        debug!(url = %url, term = %filter.term, "Requesting torrents");

        let response = self
            .client
            .get(&url)
            .header("Content-Type", "application/json")
            .query(&[
                ("term", filter.term.as_str()),
                ("res", filter.resolution.as_str()),
            ])
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;

        let envelope: ListEnvelope<TorrentCandidate> = decode_json(response).await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl TorrentSearch for TorrentApiSearcher {
    fn name(&self) -> &str {
        "torrent_api"
    }

    async fn search(&self, filter: &SearchFilter) -> Result<Vec<TorrentCandidate>, TransportError> {
        let start = Instant::now();
        let result = self.fetch(filter).await;
        record_external_request(self.name(), result.is_ok(), start.elapsed());

        let candidates = result?;
        debug!(
            term = %filter.term,
            provider = %filter.provider,
            results = candidates.len(),
            "Torrent search complete"
        );
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::searcher::ProviderFilter;

    fn searcher(url: &str) -> TorrentApiSearcher {
        TorrentApiSearcher::new(ServiceConfig {
            url: url.to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn filter(provider: ProviderFilter) -> SearchFilter {
        SearchFilter {
            provider,
            term: "Dune 2021".to_string(),
            resolution: "720p".to_string(),
        }
    }

    #[test]
    fn test_build_search_url_all() {
        let s = searcher("http://localhost:4000/");
        assert_eq!(
            s.build_search_url(&filter(ProviderFilter::All)),
            "http://localhost:4000/all/"
        );
    }

    #[test]
    fn test_build_search_url_provider() {
        let s = searcher("http://localhost:4000");
        assert_eq!(
            s.build_search_url(&filter(ProviderFilter::Only("yts".into()))),
            "http://localhost:4000/yts/"
        );
    }

    #[tokio::test]
    async fn test_search_unreachable_is_transport_error() {
        let s = searcher("http://127.0.0.1:1");
        let result = s.search(&filter(ProviderFilter::All)).await;
        assert!(result.is_err());
    }
}
