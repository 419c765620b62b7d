//! Types for film records and the film store.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the film store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Unknown film category: {0}")]
    UnknownCategory(String),

    #[error("Film {id} not found in {category}")]
    FilmNotFound { category: FilmCategory, id: i64 },
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(e: rusqlite::Error) -> Self {
        PersistenceError::Database(e.to_string())
    }
}

/// Processing state of a film, as derived from the store columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingState {
    /// Never attempted.
    Unprocessed,
    /// Attempted, nothing suitable found. Eligible for the aging window.
    ProcessedNoResult,
    /// A download was submitted. Terminal.
    ProcessedSubmitted,
}

impl ProcessingState {
    pub fn from_columns(processed: bool, processed_at: Option<DateTime<Utc>>) -> Self {
        match (processed, processed_at) {
            (true, _) => ProcessingState::ProcessedSubmitted,
            (false, Some(_)) => ProcessingState::ProcessedNoResult,
            (false, None) => ProcessingState::Unprocessed,
        }
    }
}

/// A film waiting to be acquired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilmRecord {
    pub id: i64,
    pub provider: String,
    pub title: String,
    pub year: i32,
    #[serde(default)]
    pub genres: Vec<String>,
    pub state: ProcessingState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    /// Ingestion time; the aging window is measured from it.
    pub created_at: DateTime<Utc>,
}

/// How the search term is built from a film.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleStrategy {
    /// "{title} {year}"
    WithYear,
    /// "{title}"
    TitleOnly,
}

impl TitleStrategy {
    pub fn format(&self, film: &FilmRecord) -> String {
        match self {
            TitleStrategy::WithYear => format!("{} {}", film.title, film.year),
            TitleStrategy::TitleOnly => film.title.clone(),
        }
    }
}

/// Content category. Each category lives in its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilmCategory {
    Festivals,
    Popular,
}

impl FilmCategory {
    pub const ALL: [FilmCategory; 2] = [FilmCategory::Festivals, FilmCategory::Popular];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilmCategory::Festivals => "festivals",
            FilmCategory::Popular => "popular",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            FilmCategory::Festivals => "films_festivals",
            FilmCategory::Popular => "films_popular",
        }
    }

    /// Festival titles are ambiguous without the year; popular ones are not.
    pub fn title_strategy(&self) -> TitleStrategy {
        match self {
            FilmCategory::Festivals => TitleStrategy::WithYear,
            FilmCategory::Popular => TitleStrategy::TitleOnly,
        }
    }

    pub fn format_title(&self, film: &FilmRecord) -> String {
        self.title_strategy().format(film)
    }
}

impl fmt::Display for FilmCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilmCategory {
    type Err = PersistenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "festivals" | "films_festivals" => Ok(FilmCategory::Festivals),
            "popular" | "films_popular" => Ok(FilmCategory::Popular),
            other => Err(PersistenceError::UnknownCategory(other.to_string())),
        }
    }
}

/// A film as handed over by ingestion.
#[derive(Debug, Clone)]
pub struct NewFilm {
    pub provider: String,
    pub title: String,
    pub year: i32,
    pub genres: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl NewFilm {
    pub fn new(provider: &str, title: &str, year: i32) -> Self {
        Self {
            provider: provider.to_string(),
            title: title.to_string(),
            year,
            genres: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Bounds used when selecting films for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPolicy {
    /// Max films returned by the aging query.
    pub aging_limit: u32,
    /// Max films returned by the never-attempted query.
    pub unprocessed_limit: u32,
    /// Films ingested at least this many days ago are due for a re-check.
    pub aging_min_days: u32,
    /// Films ingested more than this many days ago are no longer re-checked.
    pub aging_max_days: u32,
    /// Minimum hours between two attempts of the same film inside the window.
    pub recheck_interval_hours: u32,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            aging_limit: 10,
            unprocessed_limit: 50,
            aging_min_days: 15,
            aging_max_days: 30,
            recheck_interval_hours: 24,
        }
    }
}
