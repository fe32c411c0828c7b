//! chatdj-server library interface
//!
//! Exposes the router, shared state and services for the binaries and for
//! integration testing.

pub mod api;
pub mod error;
pub mod services;
pub mod startup;

pub use crate::error::{ApiError, ApiResult};

use axum::http::HeaderValue;
use axum::Router;
use chatdj_common::config::TomlConfig;
use chrono::{DateTime, Utc};
use services::{
    Assistant, ChatCompleter, CredentialProvider, NoopOpener, OpenAiChat, PlaybackNegotiator,
    SystemBrowser, TokenCacheProvider, UrlOpener,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub negotiator: Arc<PlaybackNegotiator>,
    pub assistant: Arc<Assistant>,
    pub credentials: Arc<dyn CredentialProvider>,
    /// Frontend origin allowed by CORS
    pub allowed_origin: String,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        opener: Arc<dyn UrlOpener>,
        chat: Option<Arc<dyn ChatCompleter>>,
        public_url: impl Into<String>,
        allowed_origin: impl Into<String>,
    ) -> Self {
        let negotiator = Arc::new(PlaybackNegotiator::new(credentials.clone(), opener));
        let assistant = Arc::new(Assistant::new(negotiator.clone(), chat, public_url));

        Self {
            negotiator,
            assistant,
            credentials,
            allowed_origin: allowed_origin.into(),
            startup_time: Utc::now(),
        }
    }

    /// Wire the production collaborators from configuration
    pub fn from_config(config: &TomlConfig) -> chatdj_common::Result<Self> {
        let credentials: Arc<dyn CredentialProvider> =
            Arc::new(TokenCacheProvider::new(&config.spotify)?);

        let opener: Arc<dyn UrlOpener> = if config.spotify.open_browser {
            Arc::new(SystemBrowser)
        } else {
            Arc::new(NoopOpener)
        };

        let chat: Option<Arc<dyn ChatCompleter>> = match config.chat_api_key() {
            Some(key) => match OpenAiChat::new(&config.chat.base_url, key, &config.chat.model) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    warn!(error = %e, "Chat client unavailable");
                    None
                }
            },
            None => {
                info!("No chat API key configured; non-music chat disabled");
                None
            }
        };

        Ok(Self::new(
            credentials,
            opener,
            chat,
            config.server.public_url(),
            config.server.allowed_origin.clone(),
        ))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let cors = match HeaderValue::from_str(&state.allowed_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            warn!(origin = %state.allowed_origin, "Invalid CORS origin; cross-origin requests disabled");
            CorsLayer::new()
        }
    };

    Router::new()
        .merge(api::spotify_routes())
        .merge(api::chat_routes())
        .merge(api::health_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
