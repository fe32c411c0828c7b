//! Assistant routing tests
//!
//! Tests the implementation of:
//! - Music keyword gate ahead of the chat completer
//! - Unrecognized music requests answered with a clarification
//! - Outcome rendering (success, authorization, errors)
//! - Chat fallback when no completer is configured or it fails

mod helpers;

use chatdj_common::outcome::UNRECOGNIZED_MESSAGE;
use chatdj_common::{MediaKind, Outcome};
use chatdj_server::services::assistant::{CHAT_UNAVAILABLE_REPLY, EMPTY_INPUT_REPLY};
use chatdj_server::services::{Assistant, ChatCompleter, PlaybackNegotiator};
use helpers::*;
use std::sync::Arc;

const PUBLIC_URL: &str = "http://127.0.0.1:8000";

fn assistant(
    credentials: FakeCredentials,
    chat: Option<Arc<dyn ChatCompleter>>,
) -> Assistant {
    let negotiator = Arc::new(PlaybackNegotiator::new(
        Arc::new(credentials),
        Arc::new(RecordingOpener::default()),
    ));
    Assistant::new(negotiator, chat, PUBLIC_URL)
}

fn signed_in_with_song() -> (FakeCredentials, Arc<FakeMediaService>) {
    let service = Arc::new(
        FakeMediaService::new()
            .with_devices(vec![device("laptop", "Work Laptop", "Computer", false)])
            .with_result(MediaKind::Song, track("1", "Hello", "Adele")),
    );
    (FakeCredentials::signed_in(service.clone()), service)
}

#[test]
fn test_music_gate_keywords() {
    assert!(Assistant::is_music_request("Play Hello by Adele"));
    assert!(Assistant::is_music_request("put some MUSIC on"));
    assert!(Assistant::is_music_request("open spotify"));
    assert!(!Assistant::is_music_request("what's the weather today?"));
}

#[tokio::test]
async fn test_music_request_is_negotiated() {
    let (credentials, service) = signed_in_with_song();
    let chat = Arc::new(FakeChat::answering("unused"));
    let assistant = assistant(credentials, Some(chat.clone()));

    let reply = assistant.respond("play the song \"Hello\"").await;

    assert_eq!(reply.text, "Playing: Hello by Adele");
    assert!(reply.outcome.as_ref().is_some_and(Outcome::is_success));
    assert!(chat.prompts().is_empty());
    assert!(!service.calls().is_empty());
}

#[tokio::test]
async fn test_unrecognized_music_request_asks_to_clarify() {
    let (credentials, service) = signed_in_with_song();
    let assistant = assistant(credentials, None);

    let reply = assistant.respond("I love music").await;

    assert_eq!(reply.outcome, Some(Outcome::Unrecognized));
    assert_eq!(reply.text, format!("Error: {}", UNRECOGNIZED_MESSAGE));
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn test_auth_required_points_at_authorize_endpoint() {
    let assistant = assistant(FakeCredentials::signed_out(), None);

    let reply = assistant.respond("play Hello").await;

    assert_eq!(
        reply.text,
        "Please authenticate with Spotify first by visiting: http://127.0.0.1:8000/spotify/authorize"
    );
    assert_eq!(reply.authorization_url.as_deref(), Some(AUTH_URL));
}

#[tokio::test]
async fn test_not_found_is_rendered_as_error() {
    let service = Arc::new(
        FakeMediaService::new().with_devices(vec![device("laptop", "Laptop", "Computer", true)]),
    );
    let assistant = assistant(FakeCredentials::signed_in(service), None);

    let reply = assistant.respond("queue the album \"Nothing\"").await;

    assert_eq!(reply.text, "Error: Album not found.");
}

#[tokio::test]
async fn test_other_text_goes_to_chat() {
    let chat = Arc::new(FakeChat::answering("Paris."));
    let assistant = assistant(FakeCredentials::signed_out(), Some(chat.clone()));

    let reply = assistant.respond("  What is the capital of France?  ").await;

    assert_eq!(reply.text, "Paris.");
    assert!(reply.outcome.is_none());
    assert_eq!(chat.prompts(), vec!["What is the capital of France?"]);
}

#[tokio::test]
async fn test_chat_without_completer() {
    let assistant = assistant(FakeCredentials::signed_out(), None);
    let reply = assistant.respond("hello there").await;
    assert_eq!(reply.text, CHAT_UNAVAILABLE_REPLY);
}

#[tokio::test]
async fn test_chat_failure_is_reported() {
    let assistant = assistant(
        FakeCredentials::signed_out(),
        Some(Arc::new(FakeChat::failing(429))),
    );
    let reply = assistant.respond("hello there").await;
    assert!(reply.text.starts_with("Error: "));
    assert!(reply.text.contains("429"));
}

#[tokio::test]
async fn test_blank_input() {
    let assistant = assistant(FakeCredentials::signed_out(), None);
    assert_eq!(assistant.respond("   ").await.text, EMPTY_INPUT_REPLY);
}
