use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::matcher::MatcherConfig;
use crate::orchestrator::OrchestratorConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub torrent_api: ServiceConfig,
    pub metadata_api: ServiceConfig,
    pub subtitle_api: ServiceConfig,
    pub qbittorrent: QBittorrentConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    /// Dump every candidate list at debug level.
    #[serde(default)]
    pub debug: bool,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    4003
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("films.db")
}

/// An HTTP service the processor talks to (torrent search, metadata, subtitles).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Base URL (e.g., "http://localhost:4000")
    pub url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// qBittorrent Web API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QBittorrentConfig {
    /// qBittorrent Web UI URL (e.g., "http://localhost:8080")
    pub url: String,
    /// Username, when the Web UI requires a login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password, when the Web UI requires a login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Sanitized config for logs and API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub torrent_api: ServiceConfig,
    pub metadata_api: ServiceConfig,
    pub subtitle_api: ServiceConfig,
    pub qbittorrent: SanitizedQBittorrentConfig,
    pub orchestrator: OrchestratorConfig,
    pub matcher: MatcherConfig,
    pub debug: bool,
}

/// Sanitized qBittorrent config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedQBittorrentConfig {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub password_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            torrent_api: config.torrent_api.clone(),
            metadata_api: config.metadata_api.clone(),
            subtitle_api: config.subtitle_api.clone(),
            qbittorrent: SanitizedQBittorrentConfig {
                url: config.qbittorrent.url.clone(),
                username: config.qbittorrent.username.clone(),
                password_configured: config
                    .qbittorrent
                    .password
                    .as_ref()
                    .is_some_and(|p| !p.is_empty()),
                timeout_secs: config.qbittorrent.timeout_secs,
            },
            orchestrator: config.orchestrator.clone(),
            matcher: config.matcher.clone(),
            debug: config.debug,
        }
    }
}
