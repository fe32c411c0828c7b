//! Conversational front door
//!
//! Music requests go through extraction and negotiation; everything else is
//! forwarded to the chat completer. Shared by `POST /chat` and the CLI.

use super::chat_completion::ChatCompleter;
use super::intent;
use super::negotiator::PlaybackNegotiator;
use chatdj_common::Outcome;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Words that route an input to the music path
const MUSIC_KEYWORDS: &[&str] = &["play", "queue", "song", "music", "spotify"];

pub const EMPTY_INPUT_REPLY: &str = "Please enter a message.";
pub const CHAT_UNAVAILABLE_REPLY: &str =
    "Chat is not configured. Try a music request such as \"play Shape of You by Ed Sheeran\".";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            outcome: None,
            authorization_url: None,
        }
    }
}

pub struct Assistant {
    negotiator: Arc<PlaybackNegotiator>,
    chat: Option<Arc<dyn ChatCompleter>>,
    public_url: String,
}

impl Assistant {
    pub fn new(
        negotiator: Arc<PlaybackNegotiator>,
        chat: Option<Arc<dyn ChatCompleter>>,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            negotiator,
            chat,
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn is_music_request(text: &str) -> bool {
        let lower = text.to_lowercase();
        MUSIC_KEYWORDS.iter().any(|k| lower.contains(k))
    }

    pub async fn respond(&self, text: &str) -> Reply {
        let text = text.trim();
        if text.is_empty() {
            return Reply::text(EMPTY_INPUT_REPLY);
        }

        if Self::is_music_request(text) {
            let outcome = match intent::extract(text) {
                Some(command) => self.negotiator.negotiate(&command).await,
                None => {
                    info!(input = %text, "Music request not recognized");
                    Outcome::Unrecognized
                }
            };
            return self.reply_for(outcome);
        }

        let Some(chat) = &self.chat else {
            return Reply::text(CHAT_UNAVAILABLE_REPLY);
        };

        match chat.complete(text).await {
            Ok(answer) => Reply::text(answer),
            Err(e) => {
                error!(error = %e, "Chat completion failed");
                Reply::text(format!("Error: {}", e))
            }
        }
    }

    /// User-facing text for a negotiation outcome
    pub fn render(&self, outcome: &Outcome) -> String {
        match outcome {
            Outcome::Success { message } => message.clone(),
            Outcome::AuthRequired { .. } => format!(
                "Please authenticate with Spotify first by visiting: {}/spotify/authorize",
                self.public_url
            ),
            other => format!("Error: {}", other.message()),
        }
    }

    fn reply_for(&self, outcome: Outcome) -> Reply {
        Reply {
            text: self.render(&outcome),
            authorization_url: outcome.authorization_url().map(str::to_string),
            outcome: Some(outcome),
        }
    }
}
