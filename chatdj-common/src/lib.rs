//! # chatdj Common Library
//!
//! Shared code for the chatdj crates including:
//! - Playback commands produced by free-text extraction
//! - Device and media snapshots taken from the playback service
//! - Negotiation outcomes returned to callers
//! - Configuration loading

pub mod command;
pub mod config;
pub mod error;
pub mod media;
pub mod outcome;

pub use command::{Action, Command, MediaKind};
pub use error::{Error, Result};
pub use media::{DeviceRef, MediaRef};
pub use outcome::Outcome;
