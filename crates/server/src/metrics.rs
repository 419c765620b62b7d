//! Prometheus metrics for observability.
//!
//! This module provides the server registry:
//! - HTTP request metrics (latency, counts, in flight)
//! - Runs in progress per category
//! - Core metrics (runs, film outcomes, external services)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use tracing::warn;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "films_processor_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("films_processor_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "films_processor_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Run Metrics
// =============================================================================

/// Runs in progress (1 = running, 0 = idle).
pub static RUNS_IN_PROGRESS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "films_processor_runs_in_progress",
            "Whether a run of the category is in progress",
        ),
        &["category"],
    )
    .unwrap()
});

/// Triggers refused because the category was already running.
pub static RUN_TRIGGERS_REJECTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "films_processor_run_triggers_rejected_total",
            "Run triggers refused while the category was running",
        ),
        &["category"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    let server_metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        Box::new(RUNS_IN_PROGRESS.clone()),
        Box::new(RUN_TRIGGERS_REJECTED.clone()),
    ];

    // Core metrics (runs, decisions, external services)
    let core_metrics = films_processor_core::metrics::all_metrics();

    for metric in server_metrics.into_iter().chain(core_metrics) {
        if let Err(e) = registry.register(metric) {
            warn!(error = %e, "Failed to register metric");
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        // Access metrics to ensure they're initialized
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/ping", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("films_processor_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_core_metrics() {
        // Prometheus only outputs vectors that have at least one child
        RUNS_IN_PROGRESS.with_label_values(&["popular"]).set(0);
        films_processor_core::metrics::RUNS_TOTAL
            .with_label_values(&["popular", "completed"])
            .inc_by(0);
        films_processor_core::metrics::EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&["torrent_api", "success"])
            .inc_by(0);

        let output = encode_metrics();
        assert!(output.contains("films_processor_runs_in_progress"));
        assert!(output.contains("films_processor_runs_total"));
        assert!(output.contains("films_processor_external_requests_total"));
    }
}
