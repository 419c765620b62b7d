//! Types for subtitle search.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::transport::{nullable_vec, TransportError};

/// A subtitle package found for a title.
///
/// One package often fits several releases, so every release attribute is a set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleCandidate {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Release groups the subtitle was synced against.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub group: Vec<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub quality: Vec<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub resolution: Vec<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub duration: Vec<String>,
}

/// Trait for subtitle search backends.
#[async_trait]
pub trait SubtitleSearch: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Search subtitle packages for a title.
    async fn search(&self, title: &str) -> Result<Vec<SubtitleCandidate>, TransportError>;
}
