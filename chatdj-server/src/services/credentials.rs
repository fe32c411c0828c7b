//! Credential provider
//!
//! The negotiator asks one question before touching the media service: is there
//! a usable session? [`TokenCacheProvider`] answers it from the token cache the
//! OAuth handshake leaves on disk. Refreshing and writing the cache happen
//! elsewhere.

use super::media_service::Session;
use super::spotify_client::SpotifyClient;
use async_trait::async_trait;
use chatdj_common::config::SpotifyConfig;
use chatdj_common::{Error, Result};
use chrono::Utc;
use reqwest::Url;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tokens this close to expiry are treated as expired
const EXPIRY_MARGIN_SECS: i64 = 60;

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Connected session, or `None` when the user has not authenticated
    async fn session(&self) -> Option<Session>;

    /// Where the user goes to grant access
    fn authorization_url(&self) -> String;
}

/// Token cache entry as written by the OAuth handshake
#[derive(Debug, Clone, Deserialize)]
pub struct CachedToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Unix seconds
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl CachedToken {
    pub fn is_expired(&self, now: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => now + EXPIRY_MARGIN_SECS >= expires_at,
            None => false,
        }
    }
}

/// Session source backed by the on-disk token cache
pub struct TokenCacheProvider {
    cache_path: PathBuf,
    api_base_url: String,
    authorization_url: String,
}

impl TokenCacheProvider {
    pub fn new(config: &SpotifyConfig) -> Result<Self> {
        let client_id = config.client_id.as_deref().unwrap_or_default();
        if client_id.is_empty() {
            warn!("Spotify client id not configured; authorization will fail");
        }

        let authorize = format!("{}/authorize", config.accounts_base_url.trim_end_matches('/'));
        let mut url = Url::parse(&authorize)
            .map_err(|e| Error::Config(format!("Invalid accounts URL {}: {}", authorize, e)))?;
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &config.redirect_uri)
            .append_pair("scope", &config.scope);

        Ok(Self {
            cache_path: config.token_cache_path.clone(),
            api_base_url: config.api_base_url.clone(),
            authorization_url: url.to_string(),
        })
    }

    /// Read the cached token; `None` when absent, unreadable or expired
    pub async fn load_token(&self) -> Option<CachedToken> {
        let contents = match tokio::fs::read_to_string(&self.cache_path).await {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %self.cache_path.display(), error = %e, "No token cache");
                return None;
            }
        };

        let token: CachedToken = match serde_json::from_str(&contents) {
            Ok(token) => token,
            Err(e) => {
                warn!(path = %self.cache_path.display(), error = %e, "Unreadable token cache");
                return None;
            }
        };

        if token.access_token.trim().is_empty() {
            warn!(path = %self.cache_path.display(), "Token cache has no access token");
            return None;
        }

        if token.is_expired(Utc::now().timestamp()) {
            info!(expires_at = ?token.expires_at, "Cached access token expired");
            return None;
        }

        Some(token)
    }
}

#[async_trait]
impl CredentialProvider for TokenCacheProvider {
    async fn session(&self) -> Option<Session> {
        let token = self.load_token().await?;

        match SpotifyClient::new(&self.api_base_url, token.access_token) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                warn!(error = %e, "Failed to build Spotify client");
                None
            }
        }
    }

    fn authorization_url(&self) -> String {
        self.authorization_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_with_cache(dir: &TempDir) -> SpotifyConfig {
        SpotifyConfig {
            client_id: Some("abc123".to_string()),
            token_cache_path: dir.path().join(".spotify_caches"),
            ..SpotifyConfig::default()
        }
    }

    #[test]
    fn test_authorization_url_carries_oauth_params() {
        let dir = TempDir::new().unwrap();
        let provider = TokenCacheProvider::new(&config_with_cache(&dir)).unwrap();
        let url = Url::parse(&provider.authorization_url()).unwrap();

        assert_eq!(url.path(), "/authorize");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("client_id".into(), "abc123".into())));
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&(
            "scope".into(),
            chatdj_common::config::DEFAULT_SCOPE.into()
        )));
    }

    #[test]
    fn test_missing_client_id_still_builds_url() {
        let provider = TokenCacheProvider::new(&SpotifyConfig::default()).unwrap();
        assert!(provider.authorization_url().contains("client_id=&"));
    }

    #[test]
    fn test_invalid_accounts_url_is_config_error() {
        let config = SpotifyConfig {
            accounts_base_url: "not a url".to_string(),
            ..SpotifyConfig::default()
        };
        assert!(matches!(TokenCacheProvider::new(&config), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_missing_cache_has_no_session() {
        let dir = TempDir::new().unwrap();
        let provider = TokenCacheProvider::new(&config_with_cache(&dir)).unwrap();
        assert!(provider.session().await.is_none());
    }

    #[tokio::test]
    async fn test_valid_cache_yields_session() {
        let dir = TempDir::new().unwrap();
        let config = config_with_cache(&dir);
        let expires_at = Utc::now().timestamp() + 3600;
        std::fs::write(
            &config.token_cache_path,
            format!(
                r#"{{"access_token":"BQD","token_type":"Bearer","expires_in":3600,
                    "refresh_token":"AQC","scope":"user-read-playback-state","expires_at":{}}}"#,
                expires_at
            ),
        )
        .unwrap();

        let provider = TokenCacheProvider::new(&config).unwrap();
        let token = provider.load_token().await.unwrap();
        assert_eq!(token.access_token, "BQD");
        assert!(provider.session().await.is_some());
    }

    #[tokio::test]
    async fn test_expired_cache_has_no_session() {
        let dir = TempDir::new().unwrap();
        let config = config_with_cache(&dir);
        let expires_at = Utc::now().timestamp() + 30;
        std::fs::write(
            &config.token_cache_path,
            format!(r#"{{"access_token":"BQD","expires_at":{}}}"#, expires_at),
        )
        .unwrap();

        let provider = TokenCacheProvider::new(&config).unwrap();
        assert!(provider.session().await.is_none());
    }

    #[tokio::test]
    async fn test_garbage_cache_has_no_session() {
        let dir = TempDir::new().unwrap();
        let config = config_with_cache(&dir);
        std::fs::write(&config.token_cache_path, "not json").unwrap();

        let provider = TokenCacheProvider::new(&config).unwrap();
        assert!(provider.session().await.is_none());
    }

    #[test]
    fn test_token_without_expiry_never_expires() {
        let token = CachedToken {
            access_token: "BQD".into(),
            token_type: None,
            expires_at: None,
            refresh_token: None,
            scope: None,
        };
        assert!(!token.is_expired(i64::MAX - EXPIRY_MARGIN_SECS));
    }
}
