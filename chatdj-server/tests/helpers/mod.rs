//! Test Helper Utilities
//!
//! Shared test doubles for chatdj-server integration tests

#![allow(dead_code)]

pub mod fakes;

pub use fakes::{
    album, device, episode, show, track, Call, AUTH_URL, FakeChat, FakeCredentials, FakeMediaService,
    RecordingOpener,
};
