//! Types for download submission.

use async_trait::async_trait;

use crate::transport::TransportError;

/// Trait for torrent client backends.
#[async_trait]
pub trait DownloadSubmitter: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Enqueue a magnet link for download.
    async fn submit(&self, magnet: &str) -> Result<(), TransportError>;
}

/// Extract the info hash from a magnet URI, lowercased.
pub fn extract_hash_from_magnet(magnet: &str) -> Option<String> {
    let start = magnet.find("urn:btih:")? + "urn:btih:".len();
    let hash: String = magnet[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if hash.is_empty() {
        None
    } else {
        Some(hash.to_lowercase())
    }
}
