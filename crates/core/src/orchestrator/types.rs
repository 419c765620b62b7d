//! Types for the run coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::film::{FilmCategory, PersistenceError};
use crate::matcher::MatchOutcome;
use crate::searcher::ProviderFilter;
use crate::transport::TransportError;

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Film store could not be opened or queried.
    #[error("film store error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Errors that fail a single film. The run continues with the next one.
#[derive(Debug, Error)]
pub enum FilmError {
    #[error("torrent search failed: {0}")]
    Search(TransportError),

    #[error("download submission failed: {0}")]
    Submission(TransportError),

    #[error("write-back failed: {0}")]
    WriteBack(#[from] PersistenceError),
}

impl FilmError {
    /// Label used in metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            FilmError::Search(_) => "search",
            FilmError::Submission(_) => "submission",
            FilmError::WriteBack(_) => "write_back",
        }
    }
}

/// Settled outcome of one film.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilmReport {
    pub film_id: i64,
    pub title: String,
    pub outcome: MatchOutcome,
}

/// A film whose evaluation failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedFilm {
    pub film_id: i64,
    pub title: String,
    pub stage: String,
    pub error: String,
}

/// Summary of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub category: FilmCategory,
    pub provider: ProviderFilter,
    /// Films pulled in the batch.
    pub films_seen: usize,
    pub outcomes: Vec<FilmReport>,
    pub failed: Vec<FailedFilm>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    fn count(&self, predicate: impl Fn(&MatchOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|r| predicate(&r.outcome)).count()
    }

    pub fn submitted_count(&self) -> usize {
        self.count(|o| matches!(o, MatchOutcome::MarkProcessedSubmitted))
    }

    pub fn no_result_count(&self) -> usize {
        self.count(|o| matches!(o, MatchOutcome::MarkProcessedNoResult))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, MatchOutcome::Skip))
    }

    /// Outcome recorded for a film, if it was settled.
    pub fn outcome_for(&self, film_id: i64) -> Option<&MatchOutcome> {
        self.outcomes
            .iter()
            .find(|r| r.film_id == film_id)
            .map(|r| &r.outcome)
    }

    pub fn failed_ids(&self) -> Vec<i64> {
        self.failed.iter().map(|f| f.film_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcomes: Vec<MatchOutcome>) -> RunReport {
        RunReport {
            run_id: "run-1".to_string(),
            category: FilmCategory::Popular,
            provider: ProviderFilter::All,
            films_seen: outcomes.len(),
            outcomes: outcomes
                .into_iter()
                .enumerate()
                .map(|(i, outcome)| FilmReport {
                    film_id: i as i64 + 1,
                    title: format!("Film {}", i + 1),
                    outcome,
                })
                .collect(),
            failed: Vec::new(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn test_report_counts() {
        let report = report(vec![
            MatchOutcome::MarkProcessedSubmitted,
            MatchOutcome::MarkProcessedNoResult,
            MatchOutcome::MarkProcessedNoResult,
            MatchOutcome::Skip,
        ]);
        assert_eq!(report.submitted_count(), 1);
        assert_eq!(report.no_result_count(), 2);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.outcome_for(4), Some(&MatchOutcome::Skip));
        assert_eq!(report.outcome_for(9), None);
    }

    #[test]
    fn test_report_serialization() {
        let report = report(vec![MatchOutcome::MarkProcessedSubmitted]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["category"], "popular");
        assert_eq!(json["provider"], "all");
        assert_eq!(json["outcomes"][0]["outcome"]["type"], "mark_processed_submitted");
    }

    #[test]
    fn test_error_display() {
        let err = OrchestratorError::from(PersistenceError::Database("locked".to_string()));
        assert_eq!(err.to_string(), "film store error: Database error: locked");

        let err = FilmError::Search(TransportError::Timeout);
        assert_eq!(err.to_string(), "torrent search failed: Request timeout");
        assert_eq!(err.stage(), "search");
    }
}
