//! Matcher configuration.

use serde::{Deserialize, Serialize};

/// Heuristics used when scanning torrent file listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// File extensions that count as subtitle files (with the leading dot).
    #[serde(default = "default_subtitle_extensions")]
    pub subtitle_extensions: Vec<String>,

    /// Case-sensitive substrings of a subtitle filename that signal the
    /// target language. Matched against the raw filename.
    #[serde(default = "default_language_hints")]
    pub language_hints: Vec<String>,
}

fn default_subtitle_extensions() -> Vec<String> {
    vec![".srt".to_string(), ".ass".to_string()]
}

fn default_language_hints() -> Vec<String> {
    vec!["spa".to_string(), "latin".to_string()]
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            subtitle_extensions: default_subtitle_extensions(),
            language_hints: default_language_hints(),
        }
    }
}
