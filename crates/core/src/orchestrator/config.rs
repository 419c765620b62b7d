//! Run coordinator configuration.

use serde::{Deserialize, Serialize};

use crate::film::SelectionPolicy;

/// Configuration for processing runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Max films pulled from the aging window per run.
    #[serde(default = "default_aging_batch_limit")]
    pub aging_batch_limit: u32,

    /// Max never-attempted films pulled per run.
    #[serde(default = "default_unprocessed_batch_limit")]
    pub unprocessed_batch_limit: u32,

    /// Films become eligible for a re-check this many days after ingestion.
    #[serde(default = "default_aging_window_min_days")]
    pub aging_window_min_days: u32,

    /// Films older than this many days are no longer re-checked.
    #[serde(default = "default_aging_window_max_days")]
    pub aging_window_max_days: u32,

    /// Minimum hours between two re-checks of the same film.
    #[serde(default = "default_recheck_interval_hours")]
    pub recheck_interval_hours: u32,

    /// Resolution requested from the torrent search service.
    #[serde(default = "default_search_resolution")]
    pub search_resolution: String,

    /// Providers the torrent search service can be restricted to.
    /// Films from any other provider are searched across all providers.
    #[serde(default = "default_known_providers")]
    pub known_providers: Vec<String>,

    /// Only mark a film as fully processed after the torrent client accepted
    /// the download. When false, a failed submission is logged and the film
    /// is marked anyway.
    #[serde(default = "default_require_confirmed_submission")]
    pub require_confirmed_submission: bool,
}

fn default_aging_batch_limit() -> u32 {
    10
}

fn default_unprocessed_batch_limit() -> u32 {
    50
}

fn default_aging_window_min_days() -> u32 {
    15
}

fn default_aging_window_max_days() -> u32 {
    30
}

fn default_recheck_interval_hours() -> u32 {
    24
}

fn default_search_resolution() -> String {
    "720p".to_string()
}

fn default_known_providers() -> Vec<String> {
    vec!["yts".to_string()]
}

fn default_require_confirmed_submission() -> bool {
    true
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            aging_batch_limit: default_aging_batch_limit(),
            unprocessed_batch_limit: default_unprocessed_batch_limit(),
            aging_window_min_days: default_aging_window_min_days(),
            aging_window_max_days: default_aging_window_max_days(),
            recheck_interval_hours: default_recheck_interval_hours(),
            search_resolution: default_search_resolution(),
            known_providers: default_known_providers(),
            require_confirmed_submission: default_require_confirmed_submission(),
        }
    }
}

impl OrchestratorConfig {
    /// Selection bounds handed to the film store.
    pub fn selection_policy(&self) -> SelectionPolicy {
        SelectionPolicy {
            aging_limit: self.aging_batch_limit,
            unprocessed_limit: self.unprocessed_batch_limit,
            aging_min_days: self.aging_window_min_days,
            aging_max_days: self.aging_window_max_days,
            recheck_interval_hours: self.recheck_interval_hours,
        }
    }
}
