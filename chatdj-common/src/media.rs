//! Snapshots of playback-service entities
//!
//! Both types are taken fresh during a single negotiation and never cached: the
//! device set and search results can change between requests.

use serde::{Deserialize, Serialize};

/// One playback-capable endpoint from the service's device list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRef {
    /// Service-assigned device id
    pub id: String,
    /// Display name ("Web Player (Chrome)", "Kitchen")
    pub name: String,
    /// Declared device type ("Computer", "Speaker", "Smartphone", ...)
    pub kind: String,
    /// Whether the service reports the device as currently active
    pub active: bool,
}

impl DeviceRef {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
        active: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
            active,
        }
    }
}

/// A playable reference resolved by search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    /// Service URI ("spotify:track:...")
    pub uri: String,
    /// Track, album, show or episode title
    pub display_title: String,
    /// First credited artist (or show publisher)
    pub display_artist: String,
    /// Browser URL for the item
    pub external_url: String,
}
