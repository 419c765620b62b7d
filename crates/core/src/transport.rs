//! Shared plumbing for the outbound HTTP adapters.
//!
//! Every external service (torrent search, torrent metadata, subtitle search,
//! torrent client) fails with the same [`TransportError`] so the matching
//! engine and the run coordinator can reason about failures uniformly.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Network, HTTP or decoding failure from an external service.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TransportError {
    /// Classify a reqwest error.
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::ConnectionFailed(e.to_string())
        } else if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else {
            TransportError::Internal(e.to_string())
        }
    }
}

/// Envelope used by the torrent and subtitle search services.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListEnvelope<T> {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub total: i64,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub data: Vec<T>,
}

/// Treat a JSON `null` list as empty.
pub(crate) fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Build an HTTP client with the given request timeout.
pub(crate) fn build_client(timeout_secs: u32) -> Result<Client, TransportError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs as u64))
        .cookie_store(true)
        .build()
        .map_err(|e| TransportError::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Check the status and decode a JSON body.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, TransportError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::Http {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(TransportError::from_reqwest)?;
    serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))
}
