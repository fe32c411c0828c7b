//! Structured playback commands
//!
//! A [`Command`] is built once per input text by the extractor (or directly by the
//! per-action HTTP endpoints) and consumed by the playback negotiator.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do with the resolved item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Start playback immediately
    Play,
    /// Append to the playback queue
    Queue,
}

impl Action {
    /// Classify the action of a whole input text
    ///
    /// Any occurrence of "queue" (which also covers "add ... to queue") selects
    /// [`Action::Queue`], wherever it appears. "play X and queue it later" is
    /// therefore a queue request.
    pub fn from_text(text: &str) -> Self {
        if text.to_lowercase().contains("queue") {
            Action::Queue
        } else {
            Action::Play
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Play => "play",
            Action::Queue => "queue",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of item a command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Song,
    Album,
    Podcast,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Song => "song",
            MediaKind::Album => "album",
            MediaKind::Podcast => "podcast",
        }
    }

    /// Capitalized form for user-facing sentences ("Album not found.")
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Song => "Song",
            MediaKind::Album => "Album",
            MediaKind::Podcast => "Podcast",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified playback request
///
/// `name` is never empty, is trimmed, and keeps the casing of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub action: Action,
    pub kind: MediaKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
}

impl Command {
    /// Build a command, rejecting names that are empty after trimming
    pub fn new(action: Action, kind: MediaKind, name: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(Error::InvalidInput(format!("{} name must not be empty", kind)));
        }

        Ok(Self {
            action,
            kind,
            name: name.to_string(),
            artist: None,
        })
    }

    /// Attach an artist; blank artists are ignored
    pub fn with_artist(mut self, artist: Option<&str>) -> Self {
        self.artist = artist
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);
        self
    }

    /// Conventional endpoint name for this action/kind pair (e.g. "queue-album")
    pub fn endpoint(&self) -> String {
        format!("{}-{}", self.action, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_queue_anywhere_in_text() {
        assert_eq!(Action::from_text("add Shape of You to queue"), Action::Queue);
        assert_eq!(Action::from_text("play X and QUEUE it later"), Action::Queue);
        assert_eq!(Action::from_text("play Shape of You"), Action::Play);
    }

    #[test]
    fn test_command_trims_and_preserves_case() {
        let cmd = Command::new(Action::Play, MediaKind::Song, "  Shape of You ").unwrap();
        assert_eq!(cmd.name, "Shape of You");
        assert!(cmd.artist.is_none());
    }

    #[test]
    fn test_command_rejects_blank_name() {
        let err = Command::new(Action::Queue, MediaKind::Album, "   ").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_with_artist_ignores_blank() {
        let cmd = Command::new(Action::Play, MediaKind::Album, "Scorpion")
            .unwrap()
            .with_artist(Some("  "));
        assert!(cmd.artist.is_none());

        let cmd = cmd.with_artist(Some(" Drake "));
        assert_eq!(cmd.artist.as_deref(), Some("Drake"));
    }

    #[test]
    fn test_endpoint_name() {
        let cmd = Command::new(Action::Queue, MediaKind::Podcast, "Impaulsive").unwrap();
        assert_eq!(cmd.endpoint(), "queue-podcast");
    }
}
