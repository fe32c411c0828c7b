//! Configuration loading and value resolution
//!
//! Each setting resolves in priority order:
//! 1. Command-line argument (highest priority, applied by the binaries)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not an error: defaults are used and the caller logs it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_SCOPE: &str =
    "user-read-playback-state user-modify-playback-state user-read-currently-playing";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8000/spotify/callback";
pub const DEFAULT_TOKEN_CACHE: &str = ".spotify_caches";
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "CHATDJ_CONFIG";

/// Complete chatdj configuration as read from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerConfig,
    pub spotify: SpotifyConfig,
    pub chat: ChatConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Externally visible base URL, used in "please authenticate" replies
    pub public_url: Option<String>,
    /// Frontend origin allowed by CORS
    pub allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            public_url: None,
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
        }
    }
}

impl ServerConfig {
    /// Base URL clients should use to reach this server
    pub fn public_url(&self) -> String {
        match &self.public_url {
            Some(url) if is_valid_value(url) => url.trim_end_matches('/').to_string(),
            _ => format!("http://{}:{}", self.host, self.port),
        }
    }
}

/// Spotify application and token cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
    /// Token cache written by the OAuth handshake
    pub token_cache_path: PathBuf,
    pub api_base_url: String,
    pub accounts_base_url: String,
    /// Open the played item in the system browser after successful playback
    pub open_browser: bool,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            token_cache_path: PathBuf::from(DEFAULT_TOKEN_CACHE),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            accounts_base_url: DEFAULT_ACCOUNTS_BASE_URL.to_string(),
            open_browser: true,
        }
    }
}

/// Chat-completion settings for non-music conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_CHAT_MODEL.to_string(),
            base_url: DEFAULT_CHAT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Where the loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file found (or none at the requested path); compiled defaults in use
    Defaults(Option<PathBuf>),
}

impl TomlConfig {
    /// Parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the config file if present, otherwise fall back to defaults
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        match path {
            Some(path) if path.exists() => Ok((Self::load(path)?, ConfigSource::File(path.to_path_buf()))),
            Some(path) => Ok((Self::default(), ConfigSource::Defaults(Some(path.to_path_buf())))),
            None => Ok((Self::default(), ConfigSource::Defaults(None))),
        }
    }

    /// Overlay environment variables on top of file values
    ///
    /// Blank variables are ignored.
    pub fn apply_env(&mut self) {
        if let Some(value) = env_value("SPOTIPY_CLIENT_ID") {
            self.spotify.client_id = Some(value);
        }
        if let Some(value) = env_value("SPOTIPY_REDIRECT_URI") {
            self.spotify.redirect_uri = value;
        }
        if let Some(value) = env_value("OPENAI_API_KEY") {
            self.chat.api_key = Some(value);
        }
        if let Some(value) = env_value("CHATDJ_LOG_LEVEL") {
            self.logging.level = value;
        }
    }

    /// Chat API key, if one is configured
    pub fn chat_api_key(&self) -> Option<&str> {
        self.chat.api_key.as_deref().filter(|k| is_valid_value(k))
    }
}

/// Resolve the config file location
///
/// Explicit path (CLI) first, then `CHATDJ_CONFIG`, then
/// `<config_dir>/chatdj/config.toml` when that file exists.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Some(path) = env_value(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir()
        .map(|d| d.join("chatdj").join("config.toml"))
        .filter(|p| p.exists())
}

/// Non-empty, non-whitespace check for configured strings
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| is_valid_value(v))
}
