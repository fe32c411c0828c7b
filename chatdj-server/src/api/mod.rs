//! HTTP API handlers for chatdj-server

pub mod chat;
pub mod health;
pub mod spotify;

pub use chat::chat_routes;
pub use health::health_routes;
pub use spotify::spotify_routes;
