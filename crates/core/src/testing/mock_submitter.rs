//! Mock download submitter for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::torrent_client::DownloadSubmitter;
use crate::transport::TransportError;

/// Mock implementation of the DownloadSubmitter trait.
///
/// Records every accepted magnet. A failed submission is not recorded.
#[derive(Debug, Clone, Default)]
pub struct MockSubmitter {
    submitted: Arc<RwLock<Vec<String>>>,
    attempts: Arc<RwLock<usize>>,
    next_error: Arc<RwLock<Option<TransportError>>>,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_next_error(&self, error: TransportError) {
        *self.next_error.write().await = Some(error);
    }

    /// Magnets accepted, in order.
    pub async fn submitted(&self) -> Vec<String> {
        self.submitted.read().await.clone()
    }

    /// Submission attempts, including failed ones.
    pub async fn attempt_count(&self) -> usize {
        *self.attempts.read().await
    }
}

#[async_trait]
impl DownloadSubmitter for MockSubmitter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn submit(&self, magnet: &str) -> Result<(), TransportError> {
        *self.attempts.write().await += 1;

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        self.submitted.write().await.push(magnet.to_string());
        Ok(())
    }
}
