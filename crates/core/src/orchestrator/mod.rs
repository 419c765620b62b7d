//! Run coordinator for batch film acquisition.
//!
//! A run walks one category's batch of films sequentially:
//! - **Selection**: aging films due for a re-check first, never-attempted films otherwise
//! - **Decision**: torrent search, then the matching engine
//! - **Settlement**: submit the chosen torrent and write the processing state back

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::RunCoordinator;
pub use types::{FailedFilm, FilmError, FilmReport, OrchestratorError, RunReport};
