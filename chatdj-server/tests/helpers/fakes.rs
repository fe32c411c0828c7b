//! Recording doubles for the service seams

use async_trait::async_trait;
use chatdj_common::{DeviceRef, MediaKind};
use chatdj_server::services::{
    ChatCompleter, ChatError, CredentialProvider, EpisodeItem, MediaService, PlaybackTarget,
    SearchItem, ServiceError, Session, UrlOpener,
};
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

pub const AUTH_URL: &str = "https://accounts.spotify.com/authorize?client_id=test";

/// One observed call on the media service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Search { kind: MediaKind, query: String },
    CurrentPlayback,
    Devices,
    StartPlayback { device_id: String, target: PlaybackTarget },
    AddToQueue { uri: String, device_id: Option<String> },
    AlbumTracks(String),
    ShowEpisodes(String),
}

/// Scripted media service that records every call in order
#[derive(Default)]
pub struct FakeMediaService {
    calls: Mutex<Vec<Call>>,
    current_device: Option<DeviceRef>,
    devices: Vec<DeviceRef>,
    results: HashMap<MediaKind, Vec<SearchItem>>,
    album_tracks: Vec<String>,
    episodes: Vec<EpisodeItem>,
    /// (uri, device id) → error, consumed on first match
    queue_failures: Mutex<Vec<(String, Option<String>, ServiceError)>>,
    playback_failure: Option<ServiceError>,
    devices_failure: Option<ServiceError>,
}

impl FakeMediaService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_current_device(mut self, device: DeviceRef) -> Self {
        self.current_device = Some(device);
        self
    }

    pub fn with_devices(mut self, devices: Vec<DeviceRef>) -> Self {
        self.devices = devices;
        self
    }

    pub fn with_result(mut self, kind: MediaKind, item: SearchItem) -> Self {
        self.results.entry(kind).or_default().push(item);
        self
    }

    pub fn with_album_tracks(mut self, tracks: &[&str]) -> Self {
        self.album_tracks = tracks.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_episodes(mut self, episodes: Vec<EpisodeItem>) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn failing_queue(self, uri: &str, device_id: Option<&str>, error: ServiceError) -> Self {
        self.queue_failures
            .lock()
            .unwrap()
            .push((uri.to_string(), device_id.map(str::to_string), error));
        self
    }

    pub fn failing_playback(mut self, error: ServiceError) -> Self {
        self.playback_failure = Some(error);
        self
    }

    pub fn failing_devices(mut self, error: ServiceError) -> Self {
        self.devices_failure = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Only the queue calls, in order
    pub fn queue_calls(&self) -> Vec<(String, Option<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::AddToQueue { uri, device_id } => Some((uri, device_id)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MediaService for FakeMediaService {
    async fn search(
        &self,
        kind: MediaKind,
        query: &str,
        limit: u32,
    ) -> Result<Vec<SearchItem>, ServiceError> {
        self.record(Call::Search {
            kind,
            query: query.to_string(),
        });
        Ok(self
            .results
            .get(&kind)
            .map(|items| items.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn current_playback_device(&self) -> Result<Option<DeviceRef>, ServiceError> {
        self.record(Call::CurrentPlayback);
        Ok(self.current_device.clone())
    }

    async fn devices(&self) -> Result<Vec<DeviceRef>, ServiceError> {
        self.record(Call::Devices);
        match &self.devices_failure {
            Some(e) => Err(e.clone()),
            None => Ok(self.devices.clone()),
        }
    }

    async fn start_playback(
        &self,
        device_id: &str,
        target: &PlaybackTarget,
    ) -> Result<(), ServiceError> {
        self.record(Call::StartPlayback {
            device_id: device_id.to_string(),
            target: target.clone(),
        });
        match &self.playback_failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn add_to_queue(&self, uri: &str, device_id: Option<&str>) -> Result<(), ServiceError> {
        self.record(Call::AddToQueue {
            uri: uri.to_string(),
            device_id: device_id.map(str::to_string),
        });

        let mut failures = self.queue_failures.lock().unwrap();
        let position = failures
            .iter()
            .position(|(u, d, _)| u == uri && d.as_deref() == device_id);
        match position {
            Some(index) => Err(failures.remove(index).2),
            None => Ok(()),
        }
    }

    async fn album_tracks(&self, album_uri: &str) -> Result<Vec<String>, ServiceError> {
        self.record(Call::AlbumTracks(album_uri.to_string()));
        Ok(self.album_tracks.clone())
    }

    async fn show_episodes(
        &self,
        show_uri: &str,
        limit: u32,
    ) -> Result<Vec<EpisodeItem>, ServiceError> {
        self.record(Call::ShowEpisodes(show_uri.to_string()));
        Ok(self.episodes.iter().take(limit as usize).cloned().collect())
    }
}

/// Credential provider with a fixed answer
pub struct FakeCredentials {
    service: Option<Arc<FakeMediaService>>,
    authenticated: bool,
}

impl FakeCredentials {
    pub fn signed_in(service: Arc<FakeMediaService>) -> Self {
        Self {
            service: Some(service),
            authenticated: true,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            service: None,
            authenticated: false,
        }
    }

    /// Has a reachable service but no usable session (expired or missing token)
    pub fn expired(service: Arc<FakeMediaService>) -> Self {
        Self {
            service: Some(service),
            authenticated: false,
        }
    }
}

#[async_trait]
impl CredentialProvider for FakeCredentials {
    async fn session(&self) -> Option<Session> {
        if !self.authenticated {
            return None;
        }
        self.service.clone().map(|s| s as Session)
    }

    fn authorization_url(&self) -> String {
        AUTH_URL.to_string()
    }
}

/// Remembers every URL it was asked to open
#[derive(Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) -> io::Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Chat completer with a canned answer
pub struct FakeChat {
    answer: Result<String, u16>,
    prompts: Mutex<Vec<String>>,
}

impl FakeChat {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Ok(answer.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            answer: Err(status),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatCompleter for FakeChat {
    async fn complete(&self, prompt: &str) -> Result<String, ChatError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.answer {
            Ok(answer) => Ok(answer.clone()),
            Err(status) => Err(ChatError::Api(*status, "quota exceeded".to_string())),
        }
    }
}

pub fn device(id: &str, name: &str, kind: &str, active: bool) -> DeviceRef {
    DeviceRef::new(id, name, kind, active)
}

pub fn track(id: &str, name: &str, artist: &str) -> SearchItem {
    SearchItem {
        uri: format!("spotify:track:{}", id),
        name: name.to_string(),
        artist: artist.to_string(),
        external_url: format!("https://open.spotify.com/track/{}", id),
        total_tracks: None,
    }
}

pub fn album(id: &str, name: &str, artist: &str, total_tracks: u32) -> SearchItem {
    SearchItem {
        uri: format!("spotify:album:{}", id),
        name: name.to_string(),
        artist: artist.to_string(),
        external_url: format!("https://open.spotify.com/album/{}", id),
        total_tracks: Some(total_tracks),
    }
}

pub fn show(id: &str, name: &str, publisher: &str) -> SearchItem {
    SearchItem {
        uri: format!("spotify:show:{}", id),
        name: name.to_string(),
        artist: publisher.to_string(),
        external_url: format!("https://open.spotify.com/show/{}", id),
        total_tracks: None,
    }
}

pub fn episode(id: &str, name: &str) -> EpisodeItem {
    EpisodeItem {
        uri: format!("spotify:episode:{}", id),
        name: name.to_string(),
        external_url: format!("https://open.spotify.com/episode/{}", id),
    }
}
