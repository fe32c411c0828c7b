//! Playback service interface
//!
//! The negotiator only talks to the external media service through
//! [`MediaService`]. The production implementation is
//! [`SpotifyClient`](super::spotify_client::SpotifyClient); tests substitute
//! recording doubles.

use async_trait::async_trait;
use chatdj_common::{DeviceRef, MediaKind};
use std::sync::Arc;
use thiserror::Error;

/// Connected session handle handed out by the credential provider
pub type Session = Arc<dyn MediaService>;

/// Failure reported by the media service
///
/// All upstream failures share this one class. The only distinction the
/// negotiator draws is [`ServiceError::is_not_found`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("http status: {status}, {message}")]
    Api { status: u16, message: String },

    /// Access token rejected (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ServiceError {
    /// "Not found"-class failure (typically a stale device id)
    pub fn is_not_found(&self) -> bool {
        self.to_string().to_lowercase().contains("not found")
    }
}

/// What `start_playback` should play
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackTarget {
    /// Explicit item URIs (tracks, episodes)
    Uris(Vec<String>),
    /// A collection such as an album
    Context(String),
}

/// One search result, before kind-specific interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchItem {
    pub uri: String,
    pub name: String,
    /// First credited artist, or the publisher for shows
    pub artist: String,
    pub external_url: String,
    /// Albums only
    pub total_tracks: Option<u32>,
}

/// One podcast episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeItem {
    pub uri: String,
    pub name: String,
    pub external_url: String,
}

/// External media-playback service
#[async_trait]
pub trait MediaService: Send + Sync {
    /// Search items of one kind (song → track, podcast → show)
    async fn search(
        &self,
        kind: MediaKind,
        query: &str,
        limit: u32,
    ) -> Result<Vec<SearchItem>, ServiceError>;

    /// Device of the live playback session, if anything is playing
    async fn current_playback_device(&self) -> Result<Option<DeviceRef>, ServiceError>;

    /// All devices known to the account, in service order
    async fn devices(&self) -> Result<Vec<DeviceRef>, ServiceError>;

    async fn start_playback(
        &self,
        device_id: &str,
        target: &PlaybackTarget,
    ) -> Result<(), ServiceError>;

    /// Append one item to the queue; `None` lets the service pick its device
    async fn add_to_queue(&self, uri: &str, device_id: Option<&str>) -> Result<(), ServiceError>;

    /// Track URIs of an album, in album order
    async fn album_tracks(&self, album_uri: &str) -> Result<Vec<String>, ServiceError>;

    /// Latest episodes of a show
    async fn show_episodes(
        &self,
        show_uri: &str,
        limit: u32,
    ) -> Result<Vec<EpisodeItem>, ServiceError>;
}
