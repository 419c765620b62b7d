//! qBittorrent download submitter.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::QBittorrentConfig;
use crate::metrics::record_external_request;
use crate::transport::{build_client, TransportError};

use super::{extract_hash_from_magnet, DownloadSubmitter};

/// qBittorrent Web API client.
pub struct QBittorrentSubmitter {
    client: Client,
    config: QBittorrentConfig,
    /// Whether the cookie jar holds a session (refreshed on auth failure).
    session: Arc<RwLock<Option<String>>>,
}

impl QBittorrentSubmitter {
    /// Create a new qBittorrent submitter.
    pub fn new(config: QBittorrentConfig) -> Result<Self, TransportError> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            config,
            session: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.config.username, &self.config.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }

    /// Login and store session cookie.
    async fn login(&self) -> Result<(), TransportError> {
        let Some((username, password)) = self.credentials() else {
            return Ok(());
        };

        let url = format!("{}/api/v2/auth/login", self.base_url());
        let params = [("username", username), ("password", password)];

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if body.contains("Ok.") {
            debug!("qBittorrent login successful");
            // Session cookie is stored by the cookie jar
            let mut session = self.session.write().await;
            *session = Some("authenticated".to_string());
            Ok(())
        } else if body.contains("Fails.") || status.as_u16() == 403 {
            Err(TransportError::Authentication(
                "Invalid credentials".to_string(),
            ))
        } else {
            Err(TransportError::Authentication(format!(
                "Unexpected response: {}",
                body.chars().take(100).collect::<String>()
            )))
        }
    }

    /// Ensure we have a valid session, logging in if needed.
    async fn ensure_authenticated(&self) -> Result<(), TransportError> {
        let session = self.session.read().await;
        if session.is_some() || self.credentials().is_none() {
            return Ok(());
        }
        drop(session);
        self.login().await
    }

    async fn send_add(&self, url: &str, magnet: &str) -> Result<reqwest::Response, TransportError> {
        self.client
            .post(url)
            .form(&[("urls", magnet)])
            .send()
            .await
            .map_err(TransportError::from_reqwest)
    }

    /// POST the magnet to `/api/v2/torrents/add`, re-authenticating once on 403.
    async fn add_magnet(&self, magnet: &str) -> Result<(), TransportError> {
        self.ensure_authenticated().await?;

        let url = format!("{}/api/v2/torrents/add", self.base_url());
        let mut response = self.send_add(&url, magnet).await?;

        if response.status().as_u16() == 403 && self.credentials().is_some() {
            warn!("qBittorrent session expired, re-authenticating");
            {
                let mut session = self.session.write().await;
                *session = None;
            }
            self.login().await?;
            response = self.send_add(&url, magnet).await?;
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(TransportError::Http {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }
        // qBittorrent answers 200 "Fails." when it rejects the link
        if body.contains("Fails.") {
            return Err(TransportError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DownloadSubmitter for QBittorrentSubmitter {
    fn name(&self) -> &str {
        "qbittorrent"
    }

    async fn submit(&self, magnet: &str) -> Result<(), TransportError> {
        let start = Instant::now();
        let result = self.add_magnet(magnet).await;
        record_external_request(self.name(), result.is_ok(), start.elapsed());
        result?;

        debug!(
            hash = %extract_hash_from_magnet(magnet).unwrap_or_default(),
            "Magnet submitted to qBittorrent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(username: Option<&str>, password: Option<&str>) -> QBittorrentConfig {
        QBittorrentConfig {
            url: "http://127.0.0.1:1/".to_string(),
            username: username.map(String::from),
            password: password.map(String::from),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_base_url_trims_slash() {
        let submitter = QBittorrentSubmitter::new(config(None, None)).unwrap();
        assert_eq!(submitter.base_url(), "http://127.0.0.1:1");
    }

    #[test]
    fn test_credentials_require_both_fields() {
        let anonymous = QBittorrentSubmitter::new(config(Some("admin"), None)).unwrap();
        assert!(anonymous.credentials().is_none());

        let authed = QBittorrentSubmitter::new(config(Some("admin"), Some("secret"))).unwrap();
        assert_eq!(authed.credentials(), Some(("admin", "secret")));
    }

    #[tokio::test]
    async fn test_submit_unreachable_is_transport_error() {
        let submitter = QBittorrentSubmitter::new(config(None, None)).unwrap();
        let result = submitter.submit("magnet:?xt=urn:btih:abc").await;
        assert!(result.is_err());
    }
}
