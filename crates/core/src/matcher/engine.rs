//! Per-film decision logic.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::inspector::TorrentInspector;
use crate::metrics::MATCH_KINDS;
use crate::searcher::TorrentCandidate;
use crate::subtitles::SubtitleSearch;
use crate::transport::TransportError;

use super::rules::{cross_match, has_language_hint, has_subtitle_extension};
use super::{FileSubtitleHit, MatchOutcome, MatcherConfig};

/// Decides which torrent candidate to download for a film.
pub struct MatchingEngine {
    inspector: Arc<dyn TorrentInspector>,
    subtitles: Arc<dyn SubtitleSearch>,
    config: MatcherConfig,
}

impl MatchingEngine {
    pub fn new(
        inspector: Arc<dyn TorrentInspector>,
        subtitles: Arc<dyn SubtitleSearch>,
        config: MatcherConfig,
    ) -> Self {
        Self {
            inspector,
            subtitles,
            config,
        }
    }

    /// Evaluate the candidates found for `title`.
    ///
    /// Never writes anything; the caller settles the outcome.
    pub async fn decide(&self, title: &str, candidates: &[TorrentCandidate]) -> MatchOutcome {
        if candidates.is_empty() {
            debug!(title = %title, "No torrent candidates");
            return MatchOutcome::MarkProcessedNoResult;
        }

        let file_hit = match self.scan_file_subtitles(candidates).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(title = %title, error = %e, "Torrent inspection failed, skipping film");
                return MatchOutcome::Skip;
            }
        };

        if let Some(hit) = &file_hit {
            if hit.language_hint {
                info!(
                    title = %title,
                    torrent = %hit.candidate.title,
                    "Torrent ships subtitles in the target language"
                );
                MATCH_KINDS.with_label_values(&["language_hint"]).inc();
                return MatchOutcome::Submit(hit.candidate.clone());
            }
        }

        let subtitles = match self.subtitles.search(title).await {
            Ok(subtitles) => subtitles,
            Err(e) => {
                warn!(title = %title, error = %e, "Subtitle search failed");
                Vec::new()
            }
        };
        debug!(title = %title, count = subtitles.len(), "Subtitle candidates");

        if !subtitles.is_empty() {
            if let Some(hit) = cross_match(candidates, &subtitles) {
                info!(
                    title = %title,
                    torrent = %hit.candidate.title,
                    kind = hit.kind.as_str(),
                    "Subtitle match found"
                );
                MATCH_KINDS.with_label_values(&[hit.kind.as_str()]).inc();
                return MatchOutcome::Submit(hit.candidate);
            }
        }

        match file_hit {
            Some(hit) => {
                info!(
                    title = %title,
                    torrent = %hit.candidate.title,
                    "Falling back to torrent with bundled subtitles"
                );
                MATCH_KINDS.with_label_values(&["file_subtitles"]).inc();
                MatchOutcome::Submit(hit.candidate)
            }
            None => {
                debug!(title = %title, "No suitable torrent");
                MatchOutcome::MarkProcessedNoResult
            }
        }
    }

    /// Find the first candidate whose file listing contains subtitle files.
    ///
    /// Inspects candidates in order and stops at the first one with subtitles.
    pub async fn scan_file_subtitles(
        &self,
        candidates: &[TorrentCandidate],
    ) -> Result<Option<FileSubtitleHit>, TransportError> {
        for candidate in candidates {
            let listing = self.inspector.list_files(candidate).await?;

            let subtitle_files: Vec<&str> = listing
                .files
                .iter()
                .map(|f| f.name.as_str())
                .filter(|name| has_subtitle_extension(name, &self.config.subtitle_extensions))
                .collect();

            if subtitle_files.is_empty() {
                continue;
            }

            let language_hint = subtitle_files
                .iter()
                .any(|name| has_language_hint(name, &self.config.language_hints));

            debug!(
                torrent = %candidate.title,
                files = subtitle_files.len(),
                language_hint,
                "Torrent contains subtitle files"
            );

            return Ok(Some(FileSubtitleHit {
                candidate: candidate.clone(),
                language_hint,
            }));
        }
        Ok(None)
    }
}
