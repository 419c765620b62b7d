//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of every external seam of a run
//! (film store, torrent search, torrent inspection, subtitle search, download
//! submission), so runs can be exercised end to end without real services.
//!
//! # Example
//!
//! ```rust,ignore
//! use films_processor_core::testing::{fixtures, MockSubmitter, MockTorrentSearch};
//!
//! let searcher = MockTorrentSearch::new();
//! let submitter = MockSubmitter::new();
//!
//! // Configure mock responses
//! searcher
//!     .set_results("Dune", vec![fixtures::torrent("720p", "WEB", "yts", "m1")])
//!     .await;
//!
//! // Build a RunCoordinator with the mocks, run, then assert on
//! // submitter.submitted().await ...
//! ```

mod mock_film_source;
mod mock_inspector;
mod mock_submitter;
mod mock_subtitle_search;
mod mock_torrent_search;

pub use mock_film_source::{MockFilmConnector, MockFilmSource, RecordedWrite};
pub use mock_inspector::MockInspector;
pub use mock_submitter::MockSubmitter;
pub use mock_subtitle_search::MockSubtitleSearch;
pub use mock_torrent_search::MockTorrentSearch;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::Utc;

    use crate::film::{FilmRecord, ProcessingState};
    use crate::searcher::TorrentCandidate;
    use crate::subtitles::SubtitleCandidate;

    /// Create a torrent candidate with the attributes the matcher looks at.
    pub fn torrent(resolution: &str, quality: &str, group: &str, magnet: &str) -> TorrentCandidate {
        TorrentCandidate {
            provider: "yts".to_string(),
            kind: "movie".to_string(),
            title: format!("Release {}", magnet),
            group: group.to_string(),
            resolution: resolution.to_string(),
            quality: quality.to_string(),
            seeds: 50,
            peers: 10,
            size: "1.2 GB".to_string(),
            magnet: magnet.to_string(),
            ..Default::default()
        }
    }

    /// Create a subtitle package covering the given attribute sets.
    pub fn subtitle(resolutions: &[&str], qualities: &[&str], groups: &[&str]) -> SubtitleCandidate {
        let owned = |values: &[&str]| values.iter().map(|v| v.to_string()).collect();
        SubtitleCandidate {
            id: 1,
            title: "Subtitle".to_string(),
            description: String::new(),
            group: owned(groups),
            quality: owned(qualities),
            resolution: owned(resolutions),
            duration: Vec::new(),
        }
    }

    /// Create an unprocessed film record.
    pub fn film(id: i64, provider: &str, title: &str, year: i32) -> FilmRecord {
        FilmRecord {
            id,
            provider: provider.to_string(),
            title: title.to_string(),
            year,
            genres: vec!["Drama".to_string()],
            state: ProcessingState::Unprocessed,
            processed_at: None,
            created_at: Utc::now(),
        }
    }
}
