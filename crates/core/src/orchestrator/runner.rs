//! Run coordinator implementation.
//!
//! One run processes one category batch, film by film:
//! - Selection: aging films first, never-attempted films when none are due
//! - Decision: torrent search, then the matching engine
//! - Settlement: submission and write-back
//!
//! A failure on one film is recorded in the report and never stops the batch.
//! Only the film store failing to open or to return a batch aborts the run.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::film::{FilmCategory, FilmRecord, FilmSource, FilmStoreConnector};
use crate::matcher::{MatchOutcome, MatchingEngine};
use crate::metrics::{CANDIDATES_FOUND, FILM_OUTCOMES, RUNS_TOTAL, RUN_DURATION};
use crate::searcher::{ProviderFilter, SearchFilter, TorrentCandidate, TorrentSearch};
use crate::torrent_client::DownloadSubmitter;

use super::config::OrchestratorConfig;
use super::types::{FailedFilm, FilmError, FilmReport, OrchestratorError, RunReport};

/// Drives processing runs over the film store.
pub struct RunCoordinator {
    config: OrchestratorConfig,
    connector: Arc<dyn FilmStoreConnector>,
    searcher: Arc<dyn TorrentSearch>,
    engine: MatchingEngine,
    submitter: Arc<dyn DownloadSubmitter>,
    /// Dump the candidate list of every film at debug level.
    debug: bool,
}

impl RunCoordinator {
    /// Create a new run coordinator.
    pub fn new(
        config: OrchestratorConfig,
        connector: Arc<dyn FilmStoreConnector>,
        searcher: Arc<dyn TorrentSearch>,
        engine: MatchingEngine,
        submitter: Arc<dyn DownloadSubmitter>,
    ) -> Self {
        Self {
            config,
            connector,
            searcher,
            engine,
            submitter,
            debug: false,
        }
    }

    /// Enable the candidate dump.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Process one batch of `category`.
    ///
    /// `provider` only narrows the never-attempted selection; aging films are
    /// always taken regardless of provider.
    pub async fn run(
        &self,
        category: FilmCategory,
        provider: ProviderFilter,
    ) -> Result<RunReport, OrchestratorError> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("run", run_id = %run_id, category = %category);
        let start = Instant::now();

        let result = self
            .run_batch(run_id, category, provider)
            .instrument(span)
            .await;

        let label = if result.is_ok() { "completed" } else { "failed" };
        RUNS_TOTAL
            .with_label_values(&[category.as_str(), label])
            .inc();
        RUN_DURATION
            .with_label_values(&[category.as_str()])
            .observe(start.elapsed().as_secs_f64());

        result
    }

    async fn run_batch(
        &self,
        run_id: String,
        category: FilmCategory,
        provider: ProviderFilter,
    ) -> Result<RunReport, OrchestratorError> {
        let started_at = Utc::now();
        info!(provider = %provider, "Starting run");

        let store = self.connector.connect().map_err(|e| {
            error!(error = %e, "Failed to open film store");
            e
        })?;

        let films = self.select_films(store.as_ref(), category, &provider)?;
        info!(count = films.len(), "Selected films");

        let mut report = RunReport {
            run_id,
            category,
            provider,
            films_seen: films.len(),
            outcomes: Vec::with_capacity(films.len()),
            failed: Vec::new(),
            started_at,
            finished_at: started_at,
        };

        for film in &films {
            let title = category.format_title(film);
            let result = self
                .process_film(store.as_ref(), category, film, &title)
                .instrument(info_span!("film", film_id = film.id))
                .await;

            match result {
                Ok(outcome) => {
                    FILM_OUTCOMES
                        .with_label_values(&[category.as_str(), outcome.label()])
                        .inc();
                    report.outcomes.push(FilmReport {
                        film_id: film.id,
                        title,
                        outcome,
                    });
                }
                Err(e) => {
                    warn!(film_id = film.id, title = %title, error = %e, "Film failed");
                    FILM_OUTCOMES
                        .with_label_values(&[category.as_str(), "failed"])
                        .inc();
                    report.failed.push(FailedFilm {
                        film_id: film.id,
                        title,
                        stage: e.stage().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report.finished_at = Utc::now();
        info!(
            processed = report.outcomes.len(),
            submitted = report.submitted_count(),
            no_result = report.no_result_count(),
            skipped = report.skipped_count(),
            failed = report.failed.len(),
            "Run finished"
        );
        Ok(report)
    }

    /// Aging films first; never-attempted films only when none are due.
    fn select_films(
        &self,
        store: &dyn FilmSource,
        category: FilmCategory,
        provider: &ProviderFilter,
    ) -> Result<Vec<FilmRecord>, OrchestratorError> {
        let aging = store.fetch_aging_unprocessed(category).map_err(|e| {
            error!(error = %e, "Failed to fetch aging films");
            e
        })?;
        if !aging.is_empty() {
            debug!(count = aging.len(), "Processing aging films");
            return Ok(aging);
        }

        let fresh = store.fetch_unprocessed(category, provider).map_err(|e| {
            error!(error = %e, "Failed to fetch unprocessed films");
            e
        })?;
        debug!(count = fresh.len(), "Processing never-attempted films");
        Ok(fresh)
    }

    /// Search, decide, settle and write back one film.
    async fn process_film(
        &self,
        store: &dyn FilmSource,
        category: FilmCategory,
        film: &FilmRecord,
        title: &str,
    ) -> Result<MatchOutcome, FilmError> {
        let filter = SearchFilter {
            provider: self.search_provider(film),
            term: title.to_string(),
            resolution: self.config.search_resolution.clone(),
        };
        debug!(title = %title, provider = %filter.provider, "Searching torrents");

        let candidates = self
            .searcher
            .search(&filter)
            .await
            .map_err(FilmError::Search)?;
        CANDIDATES_FOUND.observe(candidates.len() as f64);
        self.dump_candidates(title, &candidates);

        let decision = self.engine.decide(title, &candidates).await;
        let settled = self.settle(title, decision).await?;

        match &settled {
            MatchOutcome::MarkProcessedSubmitted => {
                store.mark_fully_processed(category, film.id)?;
            }
            MatchOutcome::MarkProcessedNoResult => {
                store.mark_processed_timestamp(category, film.id)?;
            }
            MatchOutcome::Skip | MatchOutcome::Submit(_) => {}
        }

        info!(title = %title, outcome = settled.label(), "Film settled");
        Ok(settled)
    }

    /// Turn an engine decision into the outcome that is written back.
    async fn settle(&self, title: &str, decision: MatchOutcome) -> Result<MatchOutcome, FilmError> {
        let candidate = match decision {
            MatchOutcome::Submit(candidate) => candidate,
            other => return Ok(other),
        };

        match self.submitter.submit(&candidate.magnet).await {
            Ok(()) => {
                info!(title = %title, torrent = %candidate.title, "Download submitted");
                Ok(MatchOutcome::MarkProcessedSubmitted)
            }
            Err(e) if self.config.require_confirmed_submission => Err(FilmError::Submission(e)),
            Err(e) => {
                warn!(
                    title = %title,
                    error = %e,
                    "Download submission failed, marking film as processed anyway"
                );
                Ok(MatchOutcome::MarkProcessedSubmitted)
            }
        }
    }

    /// Restrict the search to the film's provider when the search service knows it.
    fn search_provider(&self, film: &FilmRecord) -> ProviderFilter {
        let known = self
            .config
            .known_providers
            .iter()
            .any(|p| p.eq_ignore_ascii_case(&film.provider));
        if known {
            ProviderFilter::Only(film.provider.clone())
        } else {
            ProviderFilter::All
        }
    }

    fn dump_candidates(&self, title: &str, candidates: &[TorrentCandidate]) {
        if !self.debug {
            return;
        }
        match serde_json::to_string_pretty(candidates) {
            Ok(json) => debug!(title = %title, candidates = %json, "Torrent candidates"),
            Err(e) => debug!(title = %title, error = %e, "Failed to serialize candidates"),
        }
    }
}
