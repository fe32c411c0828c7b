//! Playback negotiation
//!
//! Drives one [`Command`] through the stages
//! `AuthCheck → DeviceCheck → Search → Execute → (Retry) → Done` and reports the
//! result as an [`Outcome`]. Every failure ends in exactly one `Outcome`
//! variant; `negotiate` never returns an error.
//!
//! The only retry is for queueing: a "not found" failure (usually a stale device
//! id) is retried once without a device id. Album queueing issues one call per
//! track in album order and keeps going past a failed track; already-queued
//! tracks stay queued and the first failure is reported.

use super::browser::UrlOpener;
use super::credentials::CredentialProvider;
use super::device_resolver;
use super::media_search::{self, Resolved, SearchError};
use super::media_service::{MediaService, PlaybackTarget, ServiceError};
use chatdj_common::{Action, Command, DeviceRef, Outcome};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Negotiation stage, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    AuthCheck,
    DeviceCheck,
    Search,
    Execute,
}

pub struct PlaybackNegotiator {
    credentials: Arc<dyn CredentialProvider>,
    opener: Arc<dyn UrlOpener>,
}

impl PlaybackNegotiator {
    pub fn new(credentials: Arc<dyn CredentialProvider>, opener: Arc<dyn UrlOpener>) -> Self {
        Self {
            credentials,
            opener,
        }
    }

    /// Run one command to completion
    pub async fn negotiate(&self, command: &Command) -> Outcome {
        let span = info_span!(
            "negotiate",
            id = %Uuid::new_v4(),
            action = %command.action,
            kind = %command.kind,
            name = %command.name,
        );
        self.run(command).instrument(span).await
    }

    async fn run(&self, command: &Command) -> Outcome {
        debug!(stage = ?Stage::AuthCheck);
        let Some(session) = self.credentials.session().await else {
            info!("No valid session; authorization required");
            return Outcome::AuthRequired {
                authorization_url: self.credentials.authorization_url(),
            };
        };
        let service = session.as_ref();

        debug!(stage = ?Stage::DeviceCheck);
        let device = match device_resolver::resolve(service).await {
            Ok(Some(device)) => device,
            Ok(None) => return Outcome::NoDevice,
            Err(e) => return service_failure(Stage::DeviceCheck, e),
        };

        debug!(stage = ?Stage::Search);
        let resolved = match media_search::search(service, command.kind, &command.name).await {
            Ok(resolved) => resolved,
            Err(SearchError::NotFound(kind)) => return Outcome::NotFound { kind },
            Err(SearchError::Service(e)) => return service_failure(Stage::Search, e),
        };

        debug!(stage = ?Stage::Execute, device = %device.id);
        let executed = match command.action {
            Action::Play => play(service, &device, &resolved).await,
            Action::Queue => queue(service, &device, &resolved).await,
        };

        match executed {
            Ok(track_count) => {
                if command.action == Action::Play {
                    self.open_in_browser(resolved.external_url());
                }
                let message = success_message(command.action, &resolved, track_count);
                info!(message = %message, "Negotiation succeeded");
                Outcome::Success { message }
            }
            Err(SearchError::NotFound(kind)) => Outcome::NotFound { kind },
            Err(SearchError::Service(e)) => service_failure(Stage::Execute, e),
        }
    }

    fn open_in_browser(&self, url: &str) {
        if url.is_empty() {
            return;
        }
        if let Err(e) = self.opener.open(url) {
            warn!(url = %url, error = %e, "Failed to open browser");
        }
    }
}

/// Start playback on the device; returns the track count for the success message
async fn play(
    service: &dyn MediaService,
    device: &DeviceRef,
    resolved: &Resolved,
) -> Result<u32, SearchError> {
    let (target, track_count) = match resolved {
        Resolved::Track(track) => (PlaybackTarget::Uris(vec![track.uri.clone()]), 1),
        Resolved::Album {
            album,
            total_tracks,
        } => (PlaybackTarget::Context(album.uri.clone()), *total_tracks),
        Resolved::Episode { episode, .. } => (PlaybackTarget::Uris(vec![episode.uri.clone()]), 1),
    };

    service.start_playback(&device.id, &target).await?;
    Ok(track_count)
}

/// Queue every item in order; returns the number of items attempted
async fn queue(
    service: &dyn MediaService,
    device: &DeviceRef,
    resolved: &Resolved,
) -> Result<u32, SearchError> {
    let uris = match resolved {
        Resolved::Track(track) => vec![track.uri.clone()],
        Resolved::Episode { episode, .. } => vec![episode.uri.clone()],
        Resolved::Album { album, .. } => media_search::expand_album(service, album).await?,
    };

    let mut first_failure = None;
    for uri in &uris {
        if let Err(e) = queue_with_retry(service, uri, &device.id).await {
            error!(uri = %uri, error = %e, "Failed to queue item");
            first_failure.get_or_insert(e);
        }
    }

    match first_failure {
        Some(e) => Err(e.into()),
        None => Ok(uris.len() as u32),
    }
}

async fn queue_with_retry(
    service: &dyn MediaService,
    uri: &str,
    device_id: &str,
) -> Result<(), ServiceError> {
    match service.add_to_queue(uri, Some(device_id)).await {
        Err(e) if e.is_not_found() => {
            warn!(uri = %uri, device = %device_id, error = %e, "Queue target not found; retrying without device id");
            service.add_to_queue(uri, None).await
        }
        other => other,
    }
}

fn service_failure(stage: Stage, e: ServiceError) -> Outcome {
    error!(stage = ?stage, error = %e, "Media service failure");
    Outcome::ServiceError { raw: e.to_string() }
}

fn success_message(action: Action, resolved: &Resolved, track_count: u32) -> String {
    let verb = match action {
        Action::Play => "Playing",
        Action::Queue => "Queued",
    };

    match resolved {
        Resolved::Track(track) => {
            format!("{}: {} by {}", verb, track.display_title, track.display_artist)
        }
        Resolved::Album { album, .. } => format!(
            "{} album: {} by {} ({} tracks)",
            verb, album.display_title, album.display_artist, track_count
        ),
        Resolved::Episode { show, episode } => format!(
            "{} podcast: {} - {}",
            verb, show.display_title, episode.display_title
        ),
    }
}
