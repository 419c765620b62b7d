use super::{types::Config, ConfigError};

/// Upper bound on the aging recheck batch.
pub const MAX_AGING_BATCH_LIMIT: u32 = 10;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Service URLs are non-empty http(s) URLs
/// - Aging window and batch limits are usable (aging batch at most 10)
/// - At least one subtitle extension is configured
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    for (name, url) in [
        ("torrent_api.url", &config.torrent_api.url),
        ("metadata_api.url", &config.metadata_api.url),
        ("subtitle_api.url", &config.subtitle_api.url),
        ("qbittorrent.url", &config.qbittorrent.url),
    ] {
        validate_url(name, url)?;
    }

    let orchestrator = &config.orchestrator;
    if orchestrator.aging_window_min_days >= orchestrator.aging_window_max_days {
        return Err(ConfigError::ValidationError(format!(
            "orchestrator.aging_window_min_days ({}) must be lower than aging_window_max_days ({})",
            orchestrator.aging_window_min_days, orchestrator.aging_window_max_days
        )));
    }
    if orchestrator.aging_batch_limit == 0 || orchestrator.unprocessed_batch_limit == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator batch limits cannot be 0".to_string(),
        ));
    }
    if orchestrator.aging_batch_limit > MAX_AGING_BATCH_LIMIT {
        return Err(ConfigError::ValidationError(format!(
            "orchestrator.aging_batch_limit ({}) cannot exceed {}",
            orchestrator.aging_batch_limit, MAX_AGING_BATCH_LIMIT
        )));
    }

    if config.matcher.subtitle_extensions.is_empty() {
        return Err(ConfigError::ValidationError(
            "matcher.subtitle_extensions cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_url(name: &str, url: &str) -> Result<(), ConfigError> {
    if url.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!("{} cannot be empty", name)));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "{} must start with http:// or https://, got {}",
            name, url
        )));
    }
    Ok(())
}
