//! Search adapter: entity name to playable reference
//!
//! A thin layer over [`MediaService::search`] that interprets results per kind.
//! Podcasts need a dependent second fetch (the show's latest episode). Album play
//! only needs the album context, while album queueing needs the full ordered track
//! list, obtained separately through [`expand_album`].

use super::media_service::{MediaService, SearchItem, ServiceError};
use chatdj_common::{MediaKind, MediaRef};
use thiserror::Error;
use tracing::{info, warn};

/// Why a name could not be turned into something playable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("{} not found", .0.label())]
    NotFound(MediaKind),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Playable item resolved for one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Track(MediaRef),
    Album { album: MediaRef, total_tracks: u32 },
    Episode { show: MediaRef, episode: MediaRef },
}

impl Resolved {
    /// URL opened in the browser after playback starts (the show page for podcasts)
    pub fn external_url(&self) -> &str {
        match self {
            Resolved::Track(track) => &track.external_url,
            Resolved::Album { album, .. } => &album.external_url,
            Resolved::Episode { show, .. } => &show.external_url,
        }
    }
}

/// Resolve `name` to the best match of `kind`
pub async fn search(
    service: &dyn MediaService,
    kind: MediaKind,
    name: &str,
) -> Result<Resolved, SearchError> {
    let Some(item) = service.search(kind, name, 1).await?.into_iter().next() else {
        warn!(kind = %kind, query = %name, "No search results");
        return Err(SearchError::NotFound(kind));
    };

    let resolved = match kind {
        MediaKind::Song => Resolved::Track(media_ref(&item)),
        MediaKind::Album => Resolved::Album {
            total_tracks: item.total_tracks.unwrap_or(0),
            album: media_ref(&item),
        },
        MediaKind::Podcast => {
            let Some(episode) = service.show_episodes(&item.uri, 1).await?.into_iter().next() else {
                warn!(show = %item.name, "Show has no episodes");
                return Err(SearchError::NotFound(kind));
            };
            Resolved::Episode {
                show: media_ref(&item),
                episode: MediaRef {
                    uri: episode.uri,
                    display_title: episode.name,
                    display_artist: item.artist.clone(),
                    external_url: episode.external_url,
                },
            }
        }
    };

    info!(kind = %kind, query = %name, uri = %playable_uri(&resolved), "Resolved search result");
    Ok(resolved)
}

/// Ordered track URIs of an album, for queueing
pub async fn expand_album(
    service: &dyn MediaService,
    album: &MediaRef,
) -> Result<Vec<String>, SearchError> {
    let tracks = service.album_tracks(&album.uri).await?;
    if tracks.is_empty() {
        warn!(album = %album.display_title, "Album has no tracks");
        return Err(SearchError::NotFound(MediaKind::Album));
    }
    Ok(tracks)
}

fn playable_uri(resolved: &Resolved) -> &str {
    match resolved {
        Resolved::Track(track) => &track.uri,
        Resolved::Album { album, .. } => &album.uri,
        Resolved::Episode { episode, .. } => &episode.uri,
    }
}

fn media_ref(item: &SearchItem) -> MediaRef {
    MediaRef {
        uri: item.uri.clone(),
        display_title: item.name.clone(),
        display_artist: item.artist.clone(),
        external_url: item.external_url.clone(),
    }
}
