//! Mock torrent inspector for testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::inspector::{TorrentFileListing, TorrentInspector};
use crate::searcher::TorrentCandidate;
use crate::transport::TransportError;

/// Mock implementation of the TorrentInspector trait.
///
/// Listings are keyed by magnet link; unknown magnets list no files.
#[derive(Debug, Clone, Default)]
pub struct MockInspector {
    listings: Arc<RwLock<HashMap<String, TorrentFileListing>>>,
    /// Magnets inspected, in order.
    calls: Arc<RwLock<Vec<String>>>,
    next_error: Arc<RwLock<Option<TransportError>>>,
}

impl MockInspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_listing(&self, magnet: &str, listing: TorrentFileListing) {
        self.listings
            .write()
            .await
            .insert(magnet.to_string(), listing);
    }

    pub async fn set_next_error(&self, error: TransportError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn recorded_calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl TorrentInspector for MockInspector {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_files(
        &self,
        candidate: &TorrentCandidate,
    ) -> Result<TorrentFileListing, TransportError> {
        self.calls.write().await.push(candidate.magnet.clone());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        Ok(self
            .listings
            .read()
            .await
            .get(&candidate.magnet)
            .cloned()
            .unwrap_or_default())
    }
}
