//! Mock torrent search for testing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, Semaphore};

use crate::searcher::{SearchFilter, TorrentCandidate, TorrentSearch};
use crate::transport::TransportError;

/// Mock implementation of the TorrentSearch trait.
///
/// Results are configured per search term; unknown terms return nothing.
#[derive(Debug, Clone, Default)]
pub struct MockTorrentSearch {
    results: Arc<RwLock<HashMap<String, Vec<TorrentCandidate>>>>,
    searches: Arc<RwLock<Vec<SearchFilter>>>,
    /// If set, the next search will fail with this error.
    next_error: Arc<RwLock<Option<TransportError>>>,
    /// Terms that always fail.
    failing_terms: Arc<RwLock<HashSet<String>>>,
    /// While set, searches wait until the gate is released.
    gate: Arc<RwLock<Option<Arc<Semaphore>>>>,
}

impl MockTorrentSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the results for a search term.
    pub async fn set_results(&self, term: &str, results: Vec<TorrentCandidate>) {
        self.results.write().await.insert(term.to_string(), results);
    }

    /// Make the next search fail.
    pub async fn set_next_error(&self, error: TransportError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every search for this term fail.
    pub async fn fail_term(&self, term: &str) {
        self.failing_terms.write().await.insert(term.to_string());
    }

    /// Block every search until [`release`](Self::release) is called.
    pub async fn hold(&self) {
        *self.gate.write().await = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let held and future searches through.
    pub async fn release(&self) {
        if let Some(gate) = self.gate.write().await.take() {
            gate.close();
        }
    }

    /// Recorded searches, in order.
    pub async fn recorded_searches(&self) -> Vec<SearchFilter> {
        self.searches.read().await.clone()
    }
}

#[async_trait]
impl TorrentSearch for MockTorrentSearch {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, filter: &SearchFilter) -> Result<Vec<TorrentCandidate>, TransportError> {
        self.searches.write().await.push(filter.clone());

        let gate = self.gate.read().await.clone();
        if let Some(gate) = gate {
            // a closed gate fails the acquire, which is the release signal
            let _ = gate.acquire().await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        if self.failing_terms.read().await.contains(&filter.term) {
            return Err(TransportError::ConnectionFailed(format!(
                "mock failure for {}",
                filter.term
            )));
        }

        Ok(self
            .results
            .read()
            .await
            .get(&filter.term)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::searcher::ProviderFilter;
    use std::time::Duration;

    fn filter(term: &str) -> SearchFilter {
        SearchFilter {
            provider: ProviderFilter::All,
            term: term.to_string(),
            resolution: "720p".to_string(),
        }
    }

    #[tokio::test]
    async fn test_hold_blocks_until_release() {
        let searcher = MockTorrentSearch::new();
        searcher.hold().await;

        let task = {
            let searcher = searcher.clone();
            tokio::spawn(async move { searcher.search(&filter("Dune")).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!task.is_finished());
        assert_eq!(searcher.recorded_searches().await.len(), 1);

        searcher.release().await;
        let result = task.await.unwrap();
        assert!(result.unwrap().is_empty());
    }
}
