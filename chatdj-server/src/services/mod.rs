//! Service modules for command handling
//!
//! Extraction and negotiation are pure logic over the [`MediaService`] and
//! [`CredentialProvider`] seams; the Spotify, token-cache, browser and chat
//! implementations sit behind them.

pub mod assistant;
pub mod browser;
pub mod chat_completion;
pub mod credentials;
pub mod device_resolver;
pub mod intent;
pub mod media_search;
pub mod media_service;
pub mod negotiator;
pub mod spotify_client;

pub use assistant::{Assistant, Reply};
pub use browser::{NoopOpener, SystemBrowser, UrlOpener};
pub use chat_completion::{ChatCompleter, ChatError, OpenAiChat};
pub use credentials::{CachedToken, CredentialProvider, TokenCacheProvider};
pub use media_search::{Resolved, SearchError};
pub use media_service::{
    EpisodeItem, MediaService, PlaybackTarget, SearchItem, ServiceError, Session,
};
pub use negotiator::PlaybackNegotiator;
pub use spotify_client::SpotifyClient;
