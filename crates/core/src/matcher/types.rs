//! Types produced by the matching engine.

use serde::{Deserialize, Serialize};

use crate::searcher::TorrentCandidate;

/// What should happen to a film after one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "candidate", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Download this candidate.
    Submit(TorrentCandidate),
    /// Nothing suitable; stamp the attempt and retry inside the aging window.
    MarkProcessedNoResult,
    /// A submission was confirmed; the film is done.
    MarkProcessedSubmitted,
    /// Evaluation could not finish; leave the film untouched.
    Skip,
}

impl MatchOutcome {
    /// Label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            MatchOutcome::Submit(_) => "submit",
            MatchOutcome::MarkProcessedNoResult => "no_result",
            MatchOutcome::MarkProcessedSubmitted => "submitted",
            MatchOutcome::Skip => "skipped",
        }
    }
}

/// First candidate whose file listing contains a subtitle file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSubtitleHit {
    pub candidate: TorrentCandidate,
    /// A subtitle filename of this candidate carries a language hint.
    pub language_hint: bool,
}
