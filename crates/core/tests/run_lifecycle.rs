//! Run lifecycle integration tests.
//!
//! These tests drive complete runs over an on-disk SQLite film store with
//! mocked network services, then check what was written back.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

use films_processor_core::{
    film::NewFilm,
    inspector::TorrentFileListing,
    testing::{fixtures, MockInspector, MockSubmitter, MockSubtitleSearch, MockTorrentSearch},
    FilmCategory, MatchOutcome, MatcherConfig, MatchingEngine, OrchestratorConfig,
    OrchestratorError, ProcessingState, ProviderFilter, RunCoordinator, SqliteFilmConnector,
    SqliteFilmStore,
};

/// Test helper wiring a coordinator to a temp database and mocks.
struct TestHarness {
    store: SqliteFilmStore,
    connector: SqliteFilmConnector,
    searcher: MockTorrentSearch,
    inspector: MockInspector,
    subtitles: MockSubtitleSearch,
    submitter: MockSubmitter,
    config: OrchestratorConfig,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("films.db");
        let config = OrchestratorConfig::default();

        let store = SqliteFilmStore::new(&db_path, config.selection_policy())
            .expect("Failed to create film store");
        let connector = SqliteFilmConnector::new(&db_path, config.selection_policy());

        Self {
            store,
            connector,
            searcher: MockTorrentSearch::new(),
            inspector: MockInspector::new(),
            subtitles: MockSubtitleSearch::new(),
            submitter: MockSubmitter::new(),
            config,
            _temp_dir: temp_dir,
        }
    }

    fn coordinator(&self) -> RunCoordinator {
        let engine = MatchingEngine::new(
            Arc::new(self.inspector.clone()),
            Arc::new(self.subtitles.clone()),
            MatcherConfig::default(),
        );
        RunCoordinator::new(
            self.config.clone(),
            Arc::new(self.connector.clone()),
            Arc::new(self.searcher.clone()),
            engine,
            Arc::new(self.submitter.clone()),
        )
    }

    fn insert(&self, category: FilmCategory, provider: &str, title: &str, year: i32) -> i64 {
        self.store
            .insert(category, &NewFilm::new(provider, title, year))
            .expect("Failed to insert film")
    }

    fn state(&self, category: FilmCategory, id: i64) -> ProcessingState {
        self.store.get(category, id).expect("Film not found").state
    }
}

#[tokio::test]
async fn test_dune_perfect_match_is_submitted() {
    let h = TestHarness::new();
    let id = h.insert(FilmCategory::Popular, "yts", "Dune", 2021);

    h.searcher
        .set_results("Dune", vec![fixtures::torrent("720p", "WEB", "yts", "m1")])
        .await;
    h.subtitles
        .set_results(vec![fixtures::subtitle(&["720p"], &["WEB"], &["yify"])])
        .await;

    let report = assert_ok!(
        h.coordinator()
            .run(FilmCategory::Popular, ProviderFilter::All)
            .await
    );

    assert_eq!(report.films_seen, 1);
    assert_eq!(
        report.outcome_for(id),
        Some(&MatchOutcome::MarkProcessedSubmitted)
    );
    assert_eq!(h.submitter.submitted().await, vec!["m1"]);

    let film = h.store.get(FilmCategory::Popular, id).unwrap();
    assert_eq!(film.state, ProcessingState::ProcessedSubmitted);
    assert!(film.processed_at.is_some());
}

#[tokio::test]
async fn test_dune_without_subtitles_is_stamped() {
    let h = TestHarness::new();
    let id = h.insert(FilmCategory::Popular, "yts", "Dune", 2021);

    h.searcher
        .set_results("Dune", vec![fixtures::torrent("720p", "WEB", "yts", "m1")])
        .await;

    let report = assert_ok!(
        h.coordinator()
            .run(FilmCategory::Popular, ProviderFilter::All)
            .await
    );

    assert_eq!(
        report.outcome_for(id),
        Some(&MatchOutcome::MarkProcessedNoResult)
    );
    assert!(h.submitter.submitted().await.is_empty());

    let film = h.store.get(FilmCategory::Popular, id).unwrap();
    assert_eq!(film.state, ProcessingState::ProcessedNoResult);
    assert!(film.processed_at.is_some());
}

#[tokio::test]
async fn test_stamped_film_is_not_picked_again() {
    let h = TestHarness::new();
    let id = h.insert(FilmCategory::Popular, "yts", "Dune", 2021);

    let first = h
        .coordinator()
        .run(FilmCategory::Popular, ProviderFilter::All)
        .await
        .unwrap();
    assert_eq!(first.films_seen, 1);
    assert_eq!(h.state(FilmCategory::Popular, id), ProcessingState::ProcessedNoResult);

    // fresh ingestion, not yet inside the aging window
    let second = h
        .coordinator()
        .run(FilmCategory::Popular, ProviderFilter::All)
        .await
        .unwrap();
    assert_eq!(second.films_seen, 0);
}

#[tokio::test]
async fn test_aging_film_is_rechecked() {
    let h = TestHarness::new();
    let aging = h
        .store
        .insert(
            FilmCategory::Festivals,
            &NewFilm::new("mubi", "Aftersun", 2022).created_at(Utc::now() - Duration::days(20)),
        )
        .unwrap();
    let fresh = h.insert(FilmCategory::Festivals, "yts", "Past Lives", 2023);

    h.searcher
        .set_results(
            "Aftersun 2022",
            vec![fixtures::torrent("720p", "WEB", "EVO", "m-aftersun")],
        )
        .await;
    h.inspector
        .set_listing(
            "m-aftersun",
            TorrentFileListing::from_names(["Aftersun.2022.mkv", "Aftersun.spa.srt"]),
        )
        .await;

    let report = h
        .coordinator()
        .run(FilmCategory::Festivals, ProviderFilter::All)
        .await
        .unwrap();

    assert_eq!(report.films_seen, 1);
    assert_eq!(
        report.outcome_for(aging),
        Some(&MatchOutcome::MarkProcessedSubmitted)
    );
    assert_eq!(h.submitter.submitted().await, vec!["m-aftersun"]);
    assert!(h.subtitles.recorded_calls().await.is_empty());

    let searches = h.searcher.recorded_searches().await;
    assert_eq!(searches[0].term, "Aftersun 2022");
    assert_eq!(searches[0].provider, ProviderFilter::All);

    assert_eq!(h.state(FilmCategory::Festivals, fresh), ProcessingState::Unprocessed);
}

#[tokio::test]
async fn test_provider_filter_limits_fresh_films() {
    let h = TestHarness::new();
    let yts = h.insert(FilmCategory::Popular, "yts", "Dune", 2021);
    let other = h.insert(FilmCategory::Popular, "other", "Heat", 1995);

    let report = h
        .coordinator()
        .run(FilmCategory::Popular, ProviderFilter::Only("yts".to_string()))
        .await
        .unwrap();

    assert_eq!(report.films_seen, 1);
    assert!(report.outcome_for(yts).is_some());
    assert_eq!(h.state(FilmCategory::Popular, other), ProcessingState::Unprocessed);
}

#[tokio::test]
async fn test_search_failure_does_not_stop_the_batch() {
    let h = TestHarness::new();
    let dune = h.insert(FilmCategory::Popular, "yts", "Dune", 2021);
    let heat = h.insert(FilmCategory::Popular, "yts", "Heat", 1995);

    h.searcher.fail_term("Dune").await;

    let report = h
        .coordinator()
        .run(FilmCategory::Popular, ProviderFilter::All)
        .await
        .unwrap();

    assert_eq!(report.failed_ids(), vec![dune]);
    assert_eq!(h.state(FilmCategory::Popular, dune), ProcessingState::Unprocessed);
    assert_eq!(h.state(FilmCategory::Popular, heat), ProcessingState::ProcessedNoResult);
}

#[tokio::test]
async fn test_failed_submission_keeps_film_eligible() {
    let h = TestHarness::new();
    let id = h.insert(FilmCategory::Popular, "yts", "Dune", 2021);

    h.searcher
        .set_results("Dune", vec![fixtures::torrent("720p", "WEB", "yts", "m1")])
        .await;
    h.subtitles
        .set_results(vec![fixtures::subtitle(&["720p"], &["WEB"], &["yify"])])
        .await;
    h.submitter
        .set_next_error(films_processor_core::TransportError::Timeout)
        .await;

    let report = h
        .coordinator()
        .run(FilmCategory::Popular, ProviderFilter::All)
        .await
        .unwrap();
    assert_eq!(report.failed_ids(), vec![id]);
    assert_eq!(h.state(FilmCategory::Popular, id), ProcessingState::Unprocessed);

    // next run retries and succeeds
    let report = h
        .coordinator()
        .run(FilmCategory::Popular, ProviderFilter::All)
        .await
        .unwrap();
    assert_eq!(report.submitted_count(), 1);
    assert_eq!(h.state(FilmCategory::Popular, id), ProcessingState::ProcessedSubmitted);
}

#[tokio::test]
async fn test_unreachable_database_aborts_run() {
    let temp_dir = TempDir::new().unwrap();
    // a directory is not a database file
    let connector = SqliteFilmConnector::new(temp_dir.path(), Default::default());
    let engine = MatchingEngine::new(
        Arc::new(MockInspector::new()),
        Arc::new(MockSubtitleSearch::new()),
        MatcherConfig::default(),
    );
    let coordinator = RunCoordinator::new(
        OrchestratorConfig::default(),
        Arc::new(connector),
        Arc::new(MockTorrentSearch::new()),
        engine,
        Arc::new(MockSubmitter::new()),
    );

    let result = coordinator
        .run(FilmCategory::Popular, ProviderFilter::All)
        .await;
    let err = assert_err!(result);
    assert!(matches!(err, OrchestratorError::Persistence(_)));
}
