//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Runs (per category, by result)
//! - Film decisions (per category, by outcome) and match kinds
//! - External services (torrent search, metadata, subtitles, qBittorrent)

use std::time::Duration;

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Run Metrics
// =============================================================================

/// Runs total by category and result.
pub static RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("films_processor_runs_total", "Total processing runs"),
        &["category", "result"], // "completed", "failed"
    )
    .unwrap()
});

/// Run duration in seconds.
pub static RUN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "films_processor_run_duration_seconds",
            "Duration of a processing run",
        )
        .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
        &["category"],
    )
    .unwrap()
});

// =============================================================================
// Decision Metrics
// =============================================================================

/// Settled film outcomes by category.
pub static FILM_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("films_processor_film_outcomes_total", "Settled film outcomes"),
        &["category", "outcome"], // "submitted", "no_result", "skipped", "failed"
    )
    .unwrap()
});

/// Which heuristic picked the submitted torrent.
pub static MATCH_KINDS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "films_processor_match_kinds_total",
            "Submitted torrents by matching heuristic",
        ),
        &["kind"], // "language_hint", "perfect", "partial", "file_subtitles"
    )
    .unwrap()
});

/// Torrent candidates returned per film.
pub static CANDIDATES_FOUND: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "films_processor_candidates_found",
            "Number of torrent candidates found per film",
        )
        .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0]),
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service request duration in seconds.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "films_processor_external_request_duration_seconds",
            "Duration of requests to external services",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service"],
    )
    .unwrap()
});

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "films_processor_external_requests_total",
            "Total requests to external services",
        ),
        &["service", "result"], // "success", "error"
    )
    .unwrap()
});

/// Record one request to an external service.
pub fn record_external_request(service: &str, ok: bool, elapsed: Duration) {
    let result = if ok { "success" } else { "error" };
    EXTERNAL_SERVICE_REQUESTS
        .with_label_values(&[service, result])
        .inc();
    EXTERNAL_SERVICE_DURATION
        .with_label_values(&[service])
        .observe(elapsed.as_secs_f64());
}

/// All core metrics, for registration in the server registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(RUNS_TOTAL.clone()),
        Box::new(RUN_DURATION.clone()),
        Box::new(FILM_OUTCOMES.clone()),
        Box::new(MATCH_KINDS.clone()),
        Box::new(CANDIDATES_FOUND.clone()),
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_external_request() {
        let before = EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["metrics_test", "error"])
            .get();
        record_external_request("metrics_test", false, Duration::from_millis(20));
        let after = EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["metrics_test", "error"])
            .get();
        assert_eq!(after, before + 1);
    }

    #[test]
    fn test_candidates_found_observes_without_labels() {
        let before = CANDIDATES_FOUND.get_sample_count();
        CANDIDATES_FOUND.observe(3.0);
        assert_eq!(CANDIDATES_FOUND.get_sample_count(), before + 1);
    }

    #[test]
    fn test_all_metrics_registers() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
    }
}
