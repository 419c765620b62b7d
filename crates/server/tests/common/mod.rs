//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! backed by a temporary SQLite film store, with mock network services
//! injected, enabling E2E testing without external infrastructure.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use films_processor_core::{
    film::NewFilm,
    load_config_from_str,
    testing::{MockInspector, MockSubmitter, MockSubtitleSearch, MockTorrentSearch},
    FilmCategory, MatchingEngine, RunCoordinator, SqliteFilmConnector, SqliteFilmStore,
};
use films_processor_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use films_processor_core::testing::fixtures;

const TEST_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 4003

[torrent_api]
url = "http://torrents.test"

[metadata_api]
url = "http://metadata.test/metadata"

[subtitle_api]
url = "http://subtitles.test/search"

[qbittorrent]
url = "http://qbittorrent.test"
username = "admin"
password = "secret"
"#;

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_trigger() {
///     let fixture = TestFixture::new();
///     let response = fixture.get("/process/popular").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Film store on the same database the runs use - seed films here
    pub store: SqliteFilmStore,
    pub searcher: MockTorrentSearch,
    pub inspector: MockInspector,
    pub subtitles: MockSubtitleSearch,
    pub submitter: MockSubmitter,
    /// Temporary directory for the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("films.db");

        let mut config = load_config_from_str(TEST_CONFIG).expect("Invalid test config");
        config.database.path = db_path.clone();
        let policy = config.orchestrator.selection_policy();

        let store =
            SqliteFilmStore::new(&db_path, policy.clone()).expect("Failed to create film store");

        let searcher = MockTorrentSearch::new();
        let inspector = MockInspector::new();
        let subtitles = MockSubtitleSearch::new();
        let submitter = MockSubmitter::new();

        let engine = MatchingEngine::new(
            Arc::new(inspector.clone()),
            Arc::new(subtitles.clone()),
            config.matcher.clone(),
        );
        let coordinator = RunCoordinator::new(
            config.orchestrator.clone(),
            Arc::new(SqliteFilmConnector::new(&db_path, policy)),
            Arc::new(searcher.clone()),
            engine,
            Arc::new(submitter.clone()),
        );

        let state = Arc::new(AppState::new(config, Arc::new(coordinator)));
        let router = create_router(state);

        Self {
            router,
            store,
            searcher,
            inspector,
            subtitles,
            submitter,
            temp_dir,
        }
    }

    /// Seed a never-attempted film.
    pub fn insert_film(&self, category: FilmCategory, provider: &str, title: &str, year: i32) -> i64 {
        self.store
            .insert(category, &NewFilm::new(provider, title, year))
            .expect("Failed to insert film")
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let (status, body) = self.get_raw(path).await;
        let body = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).unwrap_or(Value::Null)
        };
        TestResponse { status, body }
    }

    /// Send a GET request and return the body as text.
    pub async fn get_raw(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).to_string())
    }

    /// Poll `/runs` until the category has finished a run and return its report.
    pub async fn wait_for_report(&self, category: FilmCategory) -> Value {
        for _ in 0..200 {
            let response = self.get("/runs").await;
            let status = response.body["categories"]
                .as_array()
                .and_then(|all| {
                    all.iter()
                        .find(|c| c["category"] == category.as_str())
                        .cloned()
                })
                .unwrap_or(Value::Null);

            if status["running"] == false && !status["last_report"].is_null() {
                return status["last_report"].clone();
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Run of {} did not finish in time", category);
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
