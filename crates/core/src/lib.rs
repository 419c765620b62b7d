pub mod config;
pub mod film;
pub mod inspector;
pub mod matcher;
pub mod metrics;
pub mod orchestrator;
pub mod searcher;
pub mod subtitles;
pub mod testing;
pub mod torrent_client;
pub mod transport;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use film::{
    FilmCategory, FilmRecord, FilmSource, FilmStoreConnector, PersistenceError, ProcessingState,
    SqliteFilmConnector, SqliteFilmStore,
};
pub use inspector::{MetadataApiInspector, TorrentFileListing, TorrentInspector};
pub use matcher::{MatchOutcome, MatcherConfig, MatchingEngine};
pub use orchestrator::{OrchestratorConfig, OrchestratorError, RunCoordinator, RunReport};
pub use searcher::{ProviderFilter, SearchFilter, TorrentApiSearcher, TorrentCandidate, TorrentSearch};
pub use subtitles::{SubtitleCandidate, SubtitleSearch, SubtitlerApiClient};
pub use torrent_client::{DownloadSubmitter, QBittorrentSubmitter};
pub use transport::TransportError;
