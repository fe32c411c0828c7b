//! Opening played items in the user's browser
//!
//! A convenience after successful playback, never part of the outcome. The
//! negotiator only sees [`UrlOpener`]; tests use [`NoopOpener`].

use std::io;

pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str) -> io::Result<()>;
}

/// Hands URLs to the platform's default handler
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl UrlOpener for SystemBrowser {
    fn open(&self, url: &str) -> io::Result<()> {
        webbrowser::open(url)
    }
}

/// Does nothing (tests, headless servers, `open_browser = false`)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOpener;

impl UrlOpener for NoopOpener {
    fn open(&self, _url: &str) -> io::Result<()> {
        Ok(())
    }
}
