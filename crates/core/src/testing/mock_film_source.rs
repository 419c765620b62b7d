//! Mock film store for testing.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::film::{FilmCategory, FilmRecord, FilmSource, FilmStoreConnector, PersistenceError};
use crate::searcher::ProviderFilter;

/// A write-back recorded for test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedWrite {
    ProcessedTimestamp { category: FilmCategory, id: i64 },
    FullyProcessed { category: FilmCategory, id: i64 },
}

#[derive(Default)]
struct State {
    aging: HashMap<FilmCategory, Vec<FilmRecord>>,
    unprocessed: HashMap<FilmCategory, Vec<FilmRecord>>,
    writes: Vec<RecordedWrite>,
    unprocessed_queries: Vec<(FilmCategory, ProviderFilter)>,
    fail_fetch: bool,
    failing_writes: HashSet<i64>,
}

/// Mock implementation of the FilmSource trait.
///
/// Serves configured batches and records write-backs. The store trait is
/// synchronous, so state sits behind a std mutex.
#[derive(Clone, Default)]
pub struct MockFilmSource {
    state: Arc<Mutex<State>>,
}

impl std::fmt::Debug for MockFilmSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockFilmSource")
            .field("state", &"<state>")
            .finish()
    }
}

impl MockFilmSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Films returned by the aging query.
    pub fn set_aging(&self, category: FilmCategory, films: Vec<FilmRecord>) {
        self.state().aging.insert(category, films);
    }

    /// Films returned by the never-attempted query (before provider filtering).
    pub fn set_unprocessed(&self, category: FilmCategory, films: Vec<FilmRecord>) {
        self.state().unprocessed.insert(category, films);
    }

    /// Make every fetch fail.
    pub fn fail_fetches(&self, fail: bool) {
        self.state().fail_fetch = fail;
    }

    /// Make write-backs for this film fail.
    pub fn fail_writes_for(&self, id: i64) {
        self.state().failing_writes.insert(id);
    }

    /// Recorded write-backs, in order.
    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.state().writes.clone()
    }

    /// Provider filters passed to the never-attempted query.
    pub fn unprocessed_queries(&self) -> Vec<(FilmCategory, ProviderFilter)> {
        self.state().unprocessed_queries.clone()
    }

    fn record_write(&self, write: RecordedWrite, id: i64) -> Result<(), PersistenceError> {
        let mut state = self.state();
        if state.failing_writes.contains(&id) {
            return Err(PersistenceError::Database("mock write failure".to_string()));
        }
        state.writes.push(write);
        Ok(())
    }
}

impl FilmSource for MockFilmSource {
    fn fetch_aging_unprocessed(
        &self,
        category: FilmCategory,
    ) -> Result<Vec<FilmRecord>, PersistenceError> {
        let state = self.state();
        if state.fail_fetch {
            return Err(PersistenceError::Database("mock fetch failure".to_string()));
        }
        Ok(state.aging.get(&category).cloned().unwrap_or_default())
    }

    fn fetch_unprocessed(
        &self,
        category: FilmCategory,
        provider: &ProviderFilter,
    ) -> Result<Vec<FilmRecord>, PersistenceError> {
        let mut state = self.state();
        if state.fail_fetch {
            return Err(PersistenceError::Database("mock fetch failure".to_string()));
        }
        state.unprocessed_queries.push((category, provider.clone()));
        let films = state.unprocessed.get(&category).cloned().unwrap_or_default();
        Ok(films
            .into_iter()
            .filter(|film| match provider {
                ProviderFilter::All => true,
                ProviderFilter::Only(name) => &film.provider == name,
            })
            .collect())
    }

    fn mark_processed_timestamp(
        &self,
        category: FilmCategory,
        id: i64,
    ) -> Result<(), PersistenceError> {
        self.record_write(RecordedWrite::ProcessedTimestamp { category, id }, id)
    }

    fn mark_fully_processed(&self, category: FilmCategory, id: i64) -> Result<(), PersistenceError> {
        self.record_write(RecordedWrite::FullyProcessed { category, id }, id)
    }
}

/// Connector handing out the shared [`MockFilmSource`].
#[derive(Clone, Default)]
pub struct MockFilmConnector {
    source: MockFilmSource,
    fail_connect: Arc<AtomicBool>,
    connects: Arc<AtomicUsize>,
}

impl MockFilmConnector {
    pub fn new(source: MockFilmSource) -> Self {
        Self {
            source,
            ..Default::default()
        }
    }

    pub fn source(&self) -> &MockFilmSource {
        &self.source
    }

    /// Make `connect` fail.
    pub fn fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    /// Number of connections opened.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl FilmStoreConnector for MockFilmConnector {
    fn connect(&self) -> Result<Box<dyn FilmSource>, PersistenceError> {
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(PersistenceError::Database(
                "mock connection failure".to_string(),
            ));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.source.clone()))
    }
}
