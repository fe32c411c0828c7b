//! Spotify playback endpoints
//!
//! Six per-action endpoints take an explicit name; `/spotify/command` takes
//! free text and runs extraction first. Expected, user-actionable outcomes
//! (authorization, no device, not found, unrecognized) answer 200 with an error
//! payload; upstream service failures answer 500.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use chatdj_common::{Action, Command, MediaKind, Outcome};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::services::intent;
use crate::{ApiError, ApiResult, AppState};

/// Body of the per-action endpoints
#[derive(Debug, Deserialize)]
pub struct MediaRequest {
    #[serde(alias = "song_name")]
    pub name: String,
}

/// Body of `POST /spotify/command`
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub text: String,
}

/// Outcome as returned over HTTP
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OutcomeResponse {
    Success {
        success: String,
    },
    Failure {
        error: String,
        kind: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        authorization_url: Option<String>,
    },
}

impl From<&Outcome> for OutcomeResponse {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Success { message } => OutcomeResponse::Success {
                success: message.clone(),
            },
            other => OutcomeResponse::Failure {
                error: other.message(),
                kind: other.code().to_string(),
                authorization_url: other.authorization_url().map(str::to_string),
            },
        }
    }
}

type OutcomeReply = (StatusCode, Json<OutcomeResponse>);

fn outcome_reply(outcome: &Outcome) -> OutcomeReply {
    let status = match outcome {
        Outcome::ServiceError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    };
    (status, Json(OutcomeResponse::from(outcome)))
}

async fn dispatch(
    state: &AppState,
    action: Action,
    kind: MediaKind,
    payload: Result<Json<MediaRequest>, JsonRejection>,
) -> ApiResult<OutcomeReply> {
    let Json(request) = payload?;
    let command = Command::new(action, kind, &request.name)?;

    info!(endpoint = %command.endpoint(), name = %command.name, "Playback request");
    let outcome = state.negotiator.negotiate(&command).await;
    Ok(outcome_reply(&outcome))
}

/// POST /spotify/play-song
pub async fn play_song(
    State(state): State<AppState>,
    payload: Result<Json<MediaRequest>, JsonRejection>,
) -> ApiResult<OutcomeReply> {
    dispatch(&state, Action::Play, MediaKind::Song, payload).await
}

/// POST /spotify/queue-song
pub async fn queue_song(
    State(state): State<AppState>,
    payload: Result<Json<MediaRequest>, JsonRejection>,
) -> ApiResult<OutcomeReply> {
    dispatch(&state, Action::Queue, MediaKind::Song, payload).await
}

/// POST /spotify/play-album
pub async fn play_album(
    State(state): State<AppState>,
    payload: Result<Json<MediaRequest>, JsonRejection>,
) -> ApiResult<OutcomeReply> {
    dispatch(&state, Action::Play, MediaKind::Album, payload).await
}

/// POST /spotify/queue-album
pub async fn queue_album(
    State(state): State<AppState>,
    payload: Result<Json<MediaRequest>, JsonRejection>,
) -> ApiResult<OutcomeReply> {
    dispatch(&state, Action::Queue, MediaKind::Album, payload).await
}

/// POST /spotify/play-podcast
pub async fn play_podcast(
    State(state): State<AppState>,
    payload: Result<Json<MediaRequest>, JsonRejection>,
) -> ApiResult<OutcomeReply> {
    dispatch(&state, Action::Play, MediaKind::Podcast, payload).await
}

/// POST /spotify/queue-podcast
pub async fn queue_podcast(
    State(state): State<AppState>,
    payload: Result<Json<MediaRequest>, JsonRejection>,
) -> ApiResult<OutcomeReply> {
    dispatch(&state, Action::Queue, MediaKind::Podcast, payload).await
}

/// POST /spotify/command
///
/// Free text in, outcome out. Text no rule recognizes is reported as
/// `unrecognized` without contacting the playback service.
pub async fn run_command(
    State(state): State<AppState>,
    payload: Result<Json<CommandRequest>, JsonRejection>,
) -> ApiResult<OutcomeReply> {
    let Json(request) = payload?;
    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".to_string()));
    }

    let outcome = match intent::extract(&request.text) {
        Some(command) => state.negotiator.negotiate(&command).await,
        None => Outcome::Unrecognized,
    };
    Ok(outcome_reply(&outcome))
}

/// GET /spotify/authorize
pub async fn authorize(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.credentials.authorization_url())
}

/// Build Spotify routes
pub fn spotify_routes() -> Router<AppState> {
    Router::new()
        .route("/spotify/play-song", post(play_song))
        .route("/spotify/queue-song", post(queue_song))
        .route("/spotify/play-album", post(play_album))
        .route("/spotify/queue-album", post(queue_album))
        .route("/spotify/play-podcast", post(play_podcast))
        .route("/spotify/queue-podcast", post(queue_podcast))
        .route("/spotify/command", post(run_command))
        .route("/spotify/authorize", get(authorize))
}
