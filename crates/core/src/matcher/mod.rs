//! Matching engine - decides which torrent (if any) to download for a film.
//!
//! Decision order for one film:
//! 1. **File subtitles**: the first candidate whose listing contains a subtitle
//!    file. If one of those files carries a language hint it wins outright.
//! 2. **Subtitle search**: subtitle packages for the title are cross-matched
//!    against the candidates on resolution, quality and release group. The
//!    first candidate with a perfect (3/3) or partial (2/3) match wins.
//! 3. **Fallback**: the file-subtitle candidate from step 1, if any.
//!
//! Anything else is recorded as "processed, no result" so the film can be
//! retried inside its aging window.

mod config;
mod engine;
pub mod rules;
mod types;

pub use config::MatcherConfig;
pub use engine::MatchingEngine;
pub use rules::{CrossMatch, MatchKind};
pub use types::{FileSubtitleHit, MatchOutcome};
