//! Film records and the store they are read from.
//!
//! Films are ingested by another service; this crate only reads unprocessed
//! films per category and writes the processing state back.

mod sqlite;
mod types;

pub use sqlite::{SqliteFilmConnector, SqliteFilmStore};
pub use types::*;

/// Read/write access to the film tables of one category store.
///
/// Implementations hold a single connection; a run opens its own through a
/// [`FilmStoreConnector`].
pub trait FilmSource: Send + Sync {
    /// Unprocessed films whose aging window has arrived (bounded).
    fn fetch_aging_unprocessed(
        &self,
        category: FilmCategory,
    ) -> Result<Vec<FilmRecord>, PersistenceError>;

    /// Films that were never attempted, optionally restricted to one provider (bounded).
    fn fetch_unprocessed(
        &self,
        category: FilmCategory,
        provider: &crate::searcher::ProviderFilter,
    ) -> Result<Vec<FilmRecord>, PersistenceError>;

    /// Record an attempt without a result. The film stays eligible for the aging window.
    fn mark_processed_timestamp(
        &self,
        category: FilmCategory,
        id: i64,
    ) -> Result<(), PersistenceError>;

    /// Record a submitted download. Terminal.
    fn mark_fully_processed(&self, category: FilmCategory, id: i64)
        -> Result<(), PersistenceError>;
}

/// Opens a fresh [`FilmSource`] for one run.
pub trait FilmStoreConnector: Send + Sync {
    fn connect(&self) -> Result<Box<dyn FilmSource>, PersistenceError>;
}
