//! Mock subtitle search for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::subtitles::{SubtitleCandidate, SubtitleSearch};
use crate::transport::TransportError;

/// Mock implementation of the SubtitleSearch trait.
///
/// Returns the same configured packages for every title.
#[derive(Debug, Clone, Default)]
pub struct MockSubtitleSearch {
    results: Arc<RwLock<Vec<SubtitleCandidate>>>,
    /// Titles searched, in order.
    calls: Arc<RwLock<Vec<String>>>,
    next_error: Arc<RwLock<Option<TransportError>>>,
}

impl MockSubtitleSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_results(&self, results: Vec<SubtitleCandidate>) {
        *self.results.write().await = results;
    }

    pub async fn set_next_error(&self, error: TransportError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn recorded_calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl SubtitleSearch for MockSubtitleSearch {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, title: &str) -> Result<Vec<SubtitleCandidate>, TransportError> {
        self.calls.write().await.push(title.to_string());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        Ok(self.results.read().await.clone())
    }
}
