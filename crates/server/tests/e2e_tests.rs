//! End-to-end tests with mocked external dependencies.
//!
//! These tests run the full server stack in-process over a temporary SQLite
//! film store, with mock implementations for the torrent search, metadata,
//! subtitle and qBittorrent services.

mod common;

use axum::http::StatusCode;
use films_processor_core::{FilmCategory, ProcessingState};

use common::{fixtures, TestFixture};

// =============================================================================
// Basic API Tests
// =============================================================================

#[tokio::test]
async fn test_ping() {
    let fixture = TestFixture::new();
    let response = fixture.get("/ping").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["message"], "pong");
}

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new();
    let response = fixture.get("/health").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new();
    let response = fixture.get("/config").await;
    assert_status!(response, StatusCode::OK);

    assert_eq!(response.body["qbittorrent"]["username"], "admin");
    assert_eq!(response.body["qbittorrent"]["password_configured"], true);
    assert!(response.body["qbittorrent"].get("password").is_none());
    assert_eq!(response.body["orchestrator"]["search_resolution"], "720p");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new();
    fixture.get("/ping").await;

    let (status, body) = fixture.get_raw("/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("films_processor_http_requests_total"));
}

#[tokio::test]
async fn test_unknown_category() {
    let fixture = TestFixture::new();
    let response = fixture.get("/process/documentaries").await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_runs_idle() {
    let fixture = TestFixture::new();
    let response = fixture.get("/runs").await;
    assert_status!(response, StatusCode::OK);

    let categories = response.body["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 2);
    assert!(categories.iter().all(|c| c["running"] == false));
}

// =============================================================================
// Run Tests
// =============================================================================

#[tokio::test]
async fn test_trigger_popular_submits_match() {
    let fixture = TestFixture::new();
    let id = fixture.insert_film(FilmCategory::Popular, "yts", "Dune", 2021);

    fixture
        .searcher
        .set_results("Dune", vec![fixtures::torrent("720p", "WEB", "yts", "m1")])
        .await;
    fixture
        .subtitles
        .set_results(vec![fixtures::subtitle(&["720p"], &["WEB"], &["yify"])])
        .await;

    let response = fixture.get("/process/popular").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["message"], "ok");

    let report = fixture.wait_for_report(FilmCategory::Popular).await;
    assert_eq!(report["films_seen"], 1);
    assert_eq!(report["outcomes"][0]["film_id"], id);

    assert_eq!(fixture.submitter.submitted().await, vec!["m1"]);
    let film = fixture.store.get(FilmCategory::Popular, id).unwrap();
    assert_eq!(film.state, ProcessingState::ProcessedSubmitted);
}

#[tokio::test]
async fn test_trigger_festivals_uses_year_in_title() {
    let fixture = TestFixture::new();
    let id = fixture.insert_film(FilmCategory::Festivals, "mubi", "Aftersun", 2022);

    let response = fixture.get("/process/festivals").await;
    assert_status!(response, StatusCode::OK);

    fixture.wait_for_report(FilmCategory::Festivals).await;

    let searches = fixture.searcher.recorded_searches().await;
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].term, "Aftersun 2022");

    let film = fixture.store.get(FilmCategory::Festivals, id).unwrap();
    assert_eq!(film.state, ProcessingState::ProcessedNoResult);
}

#[tokio::test]
async fn test_trigger_with_provider_filter() {
    let fixture = TestFixture::new();
    fixture.insert_film(FilmCategory::Popular, "yts", "Dune", 2021);
    let other = fixture.insert_film(FilmCategory::Popular, "other", "Heat", 1995);

    let response = fixture.get("/process/popular?provider=yts").await;
    assert_status!(response, StatusCode::OK);

    let report = fixture.wait_for_report(FilmCategory::Popular).await;
    assert_eq!(report["provider"], "yts");
    assert_eq!(report["films_seen"], 1);

    let film = fixture.store.get(FilmCategory::Popular, other).unwrap();
    assert_eq!(film.state, ProcessingState::Unprocessed);
}

#[tokio::test]
async fn test_concurrent_trigger_is_refused() {
    let fixture = TestFixture::new();
    fixture.insert_film(FilmCategory::Popular, "yts", "Dune", 2021);

    // keep the first run inside its torrent search
    fixture.searcher.hold().await;

    let first = fixture.get("/process/popular").await;
    assert_status!(first, StatusCode::OK);

    let second = fixture.get("/process/popular").await;
    assert_status!(second, StatusCode::CONFLICT);
    assert_eq!(second.body["message"], "already running");

    // other categories are not blocked
    let festivals = fixture.get("/process/festivals").await;
    assert_status!(festivals, StatusCode::OK);

    fixture.searcher.release().await;
    let report = fixture.wait_for_report(FilmCategory::Popular).await;
    assert_eq!(report["films_seen"], 1);

    let third = fixture.get("/process/popular").await;
    assert_status!(third, StatusCode::OK);
    fixture.wait_for_report(FilmCategory::Popular).await;
}
