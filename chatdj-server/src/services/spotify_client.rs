//! Spotify Web API client
//!
//! Implements [`MediaService`] against the Web API using a bearer access token
//! obtained from the token cache. Non-2xx responses become
//! [`ServiceError::Api`] carrying Spotify's error message.

use super::media_service::{EpisodeItem, MediaService, PlaybackTarget, SearchItem, ServiceError};
use async_trait::async_trait;
use chatdj_common::{DeviceRef, MediaKind};
use reqwest::header::CONTENT_LENGTH;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const USER_AGENT: &str = concat!("chatdj/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;
const ALBUM_PAGE_SIZE: u32 = 50;

#[derive(Debug, Default, Deserialize)]
struct ExternalUrls {
    #[serde(default)]
    spotify: String,
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    name: String,
}

/// Track, album or show from a search response
#[derive(Debug, Deserialize)]
struct ItemObject {
    uri: String,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistObject>,
    /// Shows only
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default)]
    external_urls: ExternalUrls,
    /// Albums only
    #[serde(default)]
    total_tracks: Option<u32>,
}

impl From<ItemObject> for SearchItem {
    fn from(item: ItemObject) -> Self {
        let artist = item
            .artists
            .into_iter()
            .next()
            .map(|a| a.name)
            .or(item.publisher)
            .unwrap_or_default();

        SearchItem {
            uri: item.uri,
            name: item.name,
            artist,
            external_url: item.external_urls.spotify,
            total_tracks: item.total_tracks,
        }
    }
}

/// Spotify paging object; entries can be null
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct Paging<T> {
    #[serde(default)]
    items: Vec<Option<T>>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Option<Paging<ItemObject>>,
    albums: Option<Paging<ItemObject>>,
    shows: Option<Paging<ItemObject>>,
}

#[derive(Debug, Deserialize)]
struct DeviceObject {
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    is_active: bool,
}

impl DeviceObject {
    /// Restricted devices come without an id and cannot be targeted
    fn into_device_ref(self) -> Option<DeviceRef> {
        let id = self.id?;
        Some(DeviceRef::new(id, self.name, self.kind, self.is_active))
    }
}

#[derive(Debug, Deserialize)]
struct DevicesResponse {
    #[serde(default)]
    devices: Vec<DeviceObject>,
}

#[derive(Debug, Deserialize)]
struct PlaybackState {
    device: Option<DeviceObject>,
}

#[derive(Debug, Deserialize)]
struct TrackUri {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct EpisodeObject {
    uri: String,
    name: String,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorObject,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    message: String,
}

/// Spotify Web API client bound to one access token
pub struct SpotifyClient {
    http_client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl SpotifyClient {
    pub fn new(base_url: &str, access_token: impl Into<String>) -> Result<Self, ServiceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send with bearer auth; non-2xx statuses become `ServiceError::Api`
    async fn send(&self, request: RequestBuilder) -> Result<Response, ServiceError> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => parsed.error.message,
            Err(_) if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
            Err(_) => body.trim().to_string(),
        };

        tracing::debug!(status = status.as_u16(), message = %message, "Spotify API error");
        if status == StatusCode::UNAUTHORIZED {
            return Err(ServiceError::Unauthorized(message));
        }
        Err(ServiceError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Parse(e.to_string()))
    }
}

#[async_trait]
impl MediaService for SpotifyClient {
    async fn search(
        &self,
        kind: MediaKind,
        query: &str,
        limit: u32,
    ) -> Result<Vec<SearchItem>, ServiceError> {
        let search_type = match kind {
            MediaKind::Song => "track",
            MediaKind::Album => "album",
            MediaKind::Podcast => "show",
        };
        let limit = limit.to_string();

        let request = self.http_client.get(self.endpoint("/search")).query(&[
            ("q", query),
            ("type", search_type),
            ("limit", limit.as_str()),
        ]);
        let response: SearchResponse = self.get_json(request).await?;

        let paging = match kind {
            MediaKind::Song => response.tracks,
            MediaKind::Album => response.albums,
            MediaKind::Podcast => response.shows,
        };

        Ok(paging
            .map(|p| p.items.into_iter().flatten().map(SearchItem::from).collect())
            .unwrap_or_default())
    }

    async fn current_playback_device(&self) -> Result<Option<DeviceRef>, ServiceError> {
        let response = self
            .send(self.http_client.get(self.endpoint("/me/player")))
            .await?;

        // 204: nothing is playing anywhere
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        let state: PlaybackState =
            serde_json::from_str(&body).map_err(|e| ServiceError::Parse(e.to_string()))?;
        Ok(state.device.and_then(DeviceObject::into_device_ref))
    }

    async fn devices(&self) -> Result<Vec<DeviceRef>, ServiceError> {
        let response: DevicesResponse = self
            .get_json(self.http_client.get(self.endpoint("/me/player/devices")))
            .await?;

        Ok(response
            .devices
            .into_iter()
            .filter_map(DeviceObject::into_device_ref)
            .collect())
    }

    async fn start_playback(
        &self,
        device_id: &str,
        target: &PlaybackTarget,
    ) -> Result<(), ServiceError> {
        let body = match target {
            PlaybackTarget::Uris(uris) => json!({ "uris": uris }),
            PlaybackTarget::Context(uri) => json!({ "context_uri": uri }),
        };

        let request = self
            .http_client
            .put(self.endpoint("/me/player/play"))
            .query(&[("device_id", device_id)])
            .json(&body);
        self.send(request).await?;
        Ok(())
    }

    async fn add_to_queue(&self, uri: &str, device_id: Option<&str>) -> Result<(), ServiceError> {
        let mut request = self
            .http_client
            .post(self.endpoint("/me/player/queue"))
            .query(&[("uri", uri)]);
        if let Some(device_id) = device_id {
            request = request.query(&[("device_id", device_id)]);
        }

        self.send(request.header(CONTENT_LENGTH, 0)).await?;
        Ok(())
    }

    async fn album_tracks(&self, album_uri: &str) -> Result<Vec<String>, ServiceError> {
        let mut request = self
            .http_client
            .get(self.endpoint(&format!("/albums/{}/tracks", uri_id(album_uri))))
            .query(&[("limit", ALBUM_PAGE_SIZE)]);
        let mut uris = Vec::new();

        loop {
            let page: Paging<TrackUri> = self.get_json(request).await?;
            uris.extend(page.items.into_iter().flatten().map(|t| t.uri));

            match page.next {
                Some(next) => request = self.http_client.get(next),
                None => break,
            }
        }

        Ok(uris)
    }

    async fn show_episodes(
        &self,
        show_uri: &str,
        limit: u32,
    ) -> Result<Vec<EpisodeItem>, ServiceError> {
        let request = self
            .http_client
            .get(self.endpoint(&format!("/shows/{}/episodes", uri_id(show_uri))))
            .query(&[("limit", limit)]);
        let page: Paging<EpisodeObject> = self.get_json(request).await?;

        Ok(page
            .items
            .into_iter()
            .flatten()
            .map(|e| EpisodeItem {
                uri: e.uri,
                name: e.name,
                external_url: e.external_urls.spotify,
            })
            .collect())
    }
}

/// Trailing id of a Spotify URI ("spotify:album:4aaw" → "4aaw")
fn uri_id(uri: &str) -> &str {
    uri.rsplit(':').next().unwrap_or(uri)
}
