use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use films_processor_core::{
    load_config, validate_config, Config, DownloadSubmitter, FilmStoreConnector,
    MatchingEngine, MetadataApiInspector, QBittorrentSubmitter, RunCoordinator,
    SanitizedConfig, SqliteFilmConnector, SqliteFilmStore, SubtitleSearch, SubtitlerApiClient,
    TorrentApiSearcher, TorrentInspector, TorrentSearch,
};

use films_processor_server::api::create_router;
use films_processor_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("PF_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        version = VERSION,
        config_hash = &config_hash[..16],
        "Configuration loaded successfully"
    );
    info!("Database path: {:?}", config.database.path);

    let coordinator = build_coordinator(&config)?;

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), Arc::new(coordinator)));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    Ok(())
}

/// Wire the HTTP adapters and the film store into a run coordinator.
fn build_coordinator(config: &Config) -> Result<RunCoordinator> {
    let policy = config.orchestrator.selection_policy();

    // Open once so a bad path fails at startup; every run opens its own store
    SqliteFilmStore::new(&config.database.path, policy.clone())
        .context("Failed to open film store")?;
    let connector: Arc<dyn FilmStoreConnector> =
        Arc::new(SqliteFilmConnector::new(&config.database.path, policy));
    info!("Film store initialized");

    info!("Initializing torrent search at {}", config.torrent_api.url);
    let searcher: Arc<dyn TorrentSearch> = Arc::new(
        TorrentApiSearcher::new(config.torrent_api.clone())
            .context("Failed to create torrent search client")?,
    );

    info!("Initializing torrent metadata at {}", config.metadata_api.url);
    let inspector: Arc<dyn TorrentInspector> = Arc::new(
        MetadataApiInspector::new(config.metadata_api.clone())
            .context("Failed to create torrent metadata client")?,
    );

    info!("Initializing subtitle search at {}", config.subtitle_api.url);
    let subtitles: Arc<dyn SubtitleSearch> = Arc::new(
        SubtitlerApiClient::new(config.subtitle_api.clone())
            .context("Failed to create subtitle search client")?,
    );

    info!("Initializing qBittorrent client at {}", config.qbittorrent.url);
    let submitter: Arc<dyn DownloadSubmitter> = Arc::new(
        QBittorrentSubmitter::new(config.qbittorrent.clone())
            .context("Failed to create qBittorrent client")?,
    );

    let engine = MatchingEngine::new(inspector, subtitles, config.matcher.clone());

    Ok(RunCoordinator::new(
        config.orchestrator.clone(),
        connector,
        searcher,
        engine,
        submitter,
    )
    .with_debug(config.debug))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
