//! SQLite-backed film store.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use tracing::debug;

use super::{
    FilmCategory, FilmRecord, FilmSource, FilmStoreConnector, NewFilm, PersistenceError,
    ProcessingState, SelectionPolicy,
};
use crate::searcher::ProviderFilter;

const FILM_COLUMNS: &str = "id, provider, title, year, genres, processed, processed_at, created_at";

/// SQLite-backed film store.
pub struct SqliteFilmStore {
    conn: Mutex<Connection>,
    policy: SelectionPolicy,
}

impl SqliteFilmStore {
    /// Open the store, creating the database file and tables if needed.
    pub fn new(path: &Path, policy: SelectionPolicy) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            policy,
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory(policy: SelectionPolicy) -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            policy,
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), PersistenceError> {
        for category in FilmCategory::ALL {
            conn.execute_batch(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    provider TEXT NOT NULL DEFAULT '',
                    title TEXT NOT NULL,
                    year INTEGER NOT NULL DEFAULT 0,
                    genres TEXT,
                    processed INTEGER NOT NULL DEFAULT 0,
                    processed_at TEXT,
                    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
                );

                CREATE INDEX IF NOT EXISTS idx_{table}_pending ON {table}(processed, processed_at);
                CREATE INDEX IF NOT EXISTS idx_{table}_created ON {table}(created_at);
                "#,
                table = category.table()
            ))?;
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, PersistenceError> {
        self.conn
            .lock()
            .map_err(|_| PersistenceError::Database("connection mutex poisoned".to_string()))
    }

    /// Insert a film (ingestion hook, used by seeding tools and tests).
    pub fn insert(&self, category: FilmCategory, film: &NewFilm) -> Result<i64, PersistenceError> {
        let conn = self.lock()?;
        let genres = if film.genres.is_empty() {
            None
        } else {
            serde_json::to_string(&film.genres).ok()
        };
        conn.execute(
            &format!(
                "INSERT INTO {} (provider, title, year, genres, processed, processed_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, 0, NULL, ?5)",
                category.table()
            ),
            params![
                film.provider,
                film.title,
                film.year,
                genres,
                to_db_time(film.created_at)
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get a film by id.
    pub fn get(&self, category: FilmCategory, id: i64) -> Result<FilmRecord, PersistenceError> {
        let conn = self.lock()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM {} WHERE id = ?1",
                FILM_COLUMNS,
                category.table()
            ),
            params![id],
            row_to_film,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => PersistenceError::FilmNotFound { category, id },
            other => other.into(),
        })
    }

    fn query_films(
        conn: &Connection,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<FilmRecord>, PersistenceError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, row_to_film)?;

        let mut films = Vec::new();
        for row in rows {
            films.push(row?);
        }
        Ok(films)
    }

    fn update(
        &self,
        category: FilmCategory,
        id: i64,
        set_clause: &str,
    ) -> Result<(), PersistenceError> {
        let conn = self.lock()?;
        let updated = conn.execute(
            &format!(
                "UPDATE {} SET {} WHERE id = ?2",
                category.table(),
                set_clause
            ),
            params![to_db_time(Utc::now()), id],
        )?;
        if updated == 0 {
            return Err(PersistenceError::FilmNotFound { category, id });
        }
        Ok(())
    }
}

impl FilmSource for SqliteFilmStore {
    fn fetch_aging_unprocessed(
        &self,
        category: FilmCategory,
    ) -> Result<Vec<FilmRecord>, PersistenceError> {
        // SQLite date modifiers; julianday() accepts both RFC 3339 and
        // "YYYY-MM-DD HH:MM:SS" columns
        let window_end = format!("-{} days", self.policy.aging_min_days);
        let window_start = format!("-{} days", self.policy.aging_max_days);
        let recheck_before = format!("-{} hours", self.policy.recheck_interval_hours);

        let conn = self.lock()?;
        let films = Self::query_films(
            &conn,
            &format!(
                "SELECT {} FROM {}
                 WHERE processed = 0
                   AND julianday(created_at) <= julianday('now', ?1)
                   AND julianday(created_at) >= julianday('now', ?2)
                   AND (processed_at IS NULL
                        OR julianday(processed_at) <= julianday('now', ?3))
                 ORDER BY julianday(created_at) ASC
                 LIMIT ?4",
                FILM_COLUMNS,
                category.table()
            ),
            params![
                window_end,
                window_start,
                recheck_before,
                self.policy.aging_limit
            ],
        )?;

        debug!(category = %category, count = films.len(), "Fetched aging films");
        Ok(films)
    }

    fn fetch_unprocessed(
        &self,
        category: FilmCategory,
        provider: &ProviderFilter,
    ) -> Result<Vec<FilmRecord>, PersistenceError> {
        let conn = self.lock()?;
        let films = match provider {
            ProviderFilter::All => Self::query_films(
                &conn,
                &format!(
                    "SELECT {} FROM {}
                     WHERE processed = 0 AND processed_at IS NULL
                     ORDER BY id ASC
                     LIMIT ?1",
                    FILM_COLUMNS,
                    category.table()
                ),
                params![self.policy.unprocessed_limit],
            )?,
            ProviderFilter::Only(name) => Self::query_films(
                &conn,
                &format!(
                    "SELECT {} FROM {}
                     WHERE processed = 0 AND processed_at IS NULL AND provider = ?1
                     ORDER BY id ASC
                     LIMIT ?2",
                    FILM_COLUMNS,
                    category.table()
                ),
                params![name, self.policy.unprocessed_limit],
            )?,
        };

        debug!(
            category = %category,
            provider = %provider,
            count = films.len(),
            "Fetched unprocessed films"
        );
        Ok(films)
    }

    fn mark_processed_timestamp(
        &self,
        category: FilmCategory,
        id: i64,
    ) -> Result<(), PersistenceError> {
        self.update(category, id, "processed_at = ?1")
    }

    fn mark_fully_processed(
        &self,
        category: FilmCategory,
        id: i64,
    ) -> Result<(), PersistenceError> {
        self.update(category, id, "processed = 1, processed_at = ?1")
    }
}

/// Opens one [`SqliteFilmStore`] per run.
#[derive(Debug, Clone)]
pub struct SqliteFilmConnector {
    path: PathBuf,
    policy: SelectionPolicy,
}

impl SqliteFilmConnector {
    pub fn new(path: impl Into<PathBuf>, policy: SelectionPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }
}

impl FilmStoreConnector for SqliteFilmConnector {
    fn connect(&self) -> Result<Box<dyn FilmSource>, PersistenceError> {
        let store = SqliteFilmStore::new(&self.path, self.policy.clone())?;
        Ok(Box::new(store))
    }
}

fn to_db_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// RFC 3339, or SQLite's own `datetime()` format (taken as UTC).
fn parse_db_time(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
}

fn time_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let value: Option<String> = row.get(idx)?;
    value
        .map(|v| {
            parse_db_time(&v)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
        })
        .transpose()
}

fn row_to_film(row: &rusqlite::Row) -> rusqlite::Result<FilmRecord> {
    let genres: Option<String> = row.get(4)?;
    let processed: bool = row.get(5)?;
    let processed_at = time_column(row, 6)?;
    let created_at = time_column(row, 7)?.ok_or(rusqlite::Error::InvalidColumnType(
        7,
        "created_at".to_string(),
        Type::Null,
    ))?;

    Ok(FilmRecord {
        id: row.get(0)?,
        provider: row.get(1)?,
        title: row.get(2)?,
        year: row.get(3)?,
        genres: genres
            .and_then(|g| serde_json::from_str(&g).ok())
            .unwrap_or_default(),
        state: ProcessingState::from_columns(processed, processed_at),
        processed_at,
        created_at,
    })
}
