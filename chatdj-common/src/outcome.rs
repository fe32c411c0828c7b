//! Negotiation outcomes
//!
//! [`Outcome`] is the only thing a negotiation returns. Every terminal state maps
//! to exactly one variant; nothing else escapes to the caller.

use crate::MediaKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Clarification text used when no extraction rule matched
pub const UNRECOGNIZED_MESSAGE: &str = "I couldn't understand which song, album, or podcast you want to play. Could you please specify the name?";

/// Result of processing one command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Playback started or items queued
    Success { message: String },
    /// No usable credential; the user must visit the authorization URL
    AuthRequired { authorization_url: String },
    /// No playback device is available
    NoDevice,
    /// Search produced nothing playable
    NotFound { kind: MediaKind },
    /// Upstream failure, carrying the raw service error text
    ServiceError { raw: String },
    /// The input text could not be classified
    Unrecognized,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Stable machine-readable code for the variant
    pub fn code(&self) -> &'static str {
        match self {
            Outcome::Success { .. } => "success",
            Outcome::AuthRequired { .. } => "auth_required",
            Outcome::NoDevice => "no_device",
            Outcome::NotFound { .. } => "not_found",
            Outcome::ServiceError { .. } => "service_error",
            Outcome::Unrecognized => "unrecognized",
        }
    }

    /// User-facing text for the variant
    pub fn message(&self) -> String {
        match self {
            Outcome::Success { message } => message.clone(),
            Outcome::AuthRequired { .. } => {
                "User not logged in. Please authenticate with Spotify.".to_string()
            }
            Outcome::NoDevice => {
                "No active Spotify devices found. Please open Spotify on your device and try again."
                    .to_string()
            }
            Outcome::NotFound { kind } => format!("{} not found.", kind.label()),
            Outcome::ServiceError { raw } => raw.clone(),
            Outcome::Unrecognized => UNRECOGNIZED_MESSAGE.to_string(),
        }
    }

    pub fn authorization_url(&self) -> Option<&str> {
        match self {
            Outcome::AuthRequired { authorization_url } => Some(authorization_url),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
