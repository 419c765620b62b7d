//! Run trigger handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use films_processor_core::{FilmCategory, ProviderFilter, RunReport};

use super::handlers::MessageResponse;
use crate::metrics::{RUNS_IN_PROGRESS, RUN_TRIGGERS_REJECTED};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ProcessQuery {
    /// Restrict never-attempted films to one provider ("all" by default).
    #[serde(default)]
    pub provider: Option<String>,
}

/// Run state of one category.
#[derive(Debug, Serialize)]
pub struct CategoryRunStatus {
    pub category: FilmCategory,
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_report: Option<RunReport>,
}

#[derive(Debug, Serialize)]
pub struct RunsResponse {
    pub categories: Vec<CategoryRunStatus>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Start a run of the category in the background.
///
/// Replies immediately; the outcome is logged and kept for `/runs`.
pub async fn trigger(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(query): Query<ProcessQuery>,
) -> Response {
    let category = match category.parse::<FilmCategory>() {
        Ok(category) => category,
        Err(e) => {
            return (StatusCode::NOT_FOUND, MessageResponse::new(e.to_string())).into_response()
        }
    };
    let provider = ProviderFilter::parse(query.provider.as_deref().unwrap_or_default());

    let Some(permit) = state.runs().try_acquire(category) else {
        warn!(category = %category, "Run already in progress, trigger refused");
        RUN_TRIGGERS_REJECTED
            .with_label_values(&[category.as_str()])
            .inc();
        return (StatusCode::CONFLICT, MessageResponse::new("already running")).into_response();
    };

    info!(category = %category, provider = %provider, "Run triggered");
    let task_state = Arc::clone(&state);
    tokio::spawn(async move {
        let _permit = permit;
        let gauge = RUNS_IN_PROGRESS.with_label_values(&[category.as_str()]);
        gauge.set(1);

        match task_state.coordinator().run(category, provider).await {
            Ok(report) => {
                info!(
                    category = %category,
                    run_id = %report.run_id,
                    processed = report.outcomes.len(),
                    failed = report.failed.len(),
                    "Run completed"
                );
                task_state.record_report(report).await;
            }
            Err(e) => error!(category = %category, error = %e, "Run aborted"),
        }

        gauge.set(0);
    });

    MessageResponse::new("ok").into_response()
}

/// Run state and last report of every category.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<RunsResponse> {
    let mut categories = Vec::with_capacity(FilmCategory::ALL.len());
    for category in FilmCategory::ALL {
        categories.push(CategoryRunStatus {
            category,
            running: state.runs().is_running(category),
            last_report: state.last_report(category).await,
        });
    }
    Json(RunsResponse { categories })
}
