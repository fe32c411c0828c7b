//! Chat-completion client wire-format tests

use chatdj_server::services::{ChatCompleter, ChatError, OpenAiChat};
use mockito::{Matcher, Server};
use serde_json::json;

#[tokio::test]
async fn test_completion_returns_trimmed_first_choice() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::Json(json!({
            "model": "gpt-3.5-turbo",
            "messages": [{"role": "user", "content": "Tell me a joke"}]
        })))
        .with_status(200)
        .with_body(
            json!({
                "choices": [{"message": {"role": "assistant", "content": "  Why did the DJ cross the road?\n"}}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let chat = OpenAiChat::new(&server.url(), "sk-test", "gpt-3.5-turbo").unwrap();
    let answer = chat.complete("Tell me a joke").await.unwrap();

    mock.assert_async().await;
    assert_eq!(answer, "Why did the DJ cross the road?");
}

#[tokio::test]
async fn test_completion_api_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body(r#"{"error":{"message":"Rate limit reached"}}"#)
        .create_async()
        .await;

    let chat = OpenAiChat::new(&server.url(), "sk-test", "gpt-3.5-turbo").unwrap();
    let err = chat.complete("hi").await.unwrap_err();
    assert!(matches!(err, ChatError::Api(429, _)));
}

#[tokio::test]
async fn test_completion_without_choices() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[]}"#)
        .create_async()
        .await;

    let chat = OpenAiChat::new(&server.url(), "sk-test", "gpt-3.5-turbo").unwrap();
    assert!(matches!(
        chat.complete("hi").await,
        Err(ChatError::EmptyResponse)
    ));
}
