//! Audio engine abstraction.
//!
//! The coordinator drives exactly one engine. Real decoding happens outside
//! this crate; an engine only has to accept a stream URL and a rate change,
//! and report the load status of the current stream.

use tracing::{debug, info};
use url::Url;

use crate::errors::{PlayerError, Result};

/// Load status of the stream held by an engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamStatus {
    /// Nothing loaded.
    Unloaded,
    /// A stream URL is set and still connecting.
    Loading,
    /// The stream can play.
    ReadyToPlay,
    /// The stream could not be opened.
    Failed(String),
}

impl StreamStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StreamStatus::Unloaded => "UNLOADED",
            StreamStatus::Loading => "LOADING",
            StreamStatus::ReadyToPlay => "READY",
            StreamStatus::Failed(_) => "FAILED",
        }
    }
}

/// Transport surface of the single shared player.
///
/// `load` replaces the current stream and leaves the engine paused.
pub trait PlaybackEngine: Send {
    fn load(&mut self, url: &Url) -> Result<()>;

    fn play(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    /// Drops the current stream, if any.
    fn unload(&mut self);

    /// True when the playback rate is zero.
    fn is_paused(&self) -> bool;

    fn status(&self) -> StreamStatus;

    fn current_url(&self) -> Option<&Url>;
}

/// Engine that records transport calls without producing audio.
///
/// Used by the command-line player and by tests.
#[derive(Debug, Default)]
pub struct VirtualEngine {
    url: Option<Url>,
    rate: f32,
    status: Option<StreamStatus>,
    loads: u32,
}

impl VirtualEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of streams loaded so far.
    pub fn load_count(&self) -> u32 {
        self.loads
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }
}

impl PlaybackEngine for VirtualEngine {
    fn load(&mut self, url: &Url) -> Result<()> {
        if !matches!(url.scheme(), "http" | "https") {
            let reason = format!("unsupported scheme {}", url.scheme());
            self.status = Some(StreamStatus::Failed(reason.clone()));
            return Err(PlayerError::StreamFailed(url.to_string(), reason));
        }
        self.url = Some(url.clone());
        self.rate = 0.0;
        self.loads += 1;
        self.status = Some(StreamStatus::ReadyToPlay);
        debug!(%url, "Stream loaded");
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        match self.status() {
            StreamStatus::ReadyToPlay | StreamStatus::Loading => {
                self.rate = 1.0;
                info!(url = ?self.url.as_ref().map(Url::as_str), "Playing");
                Ok(())
            }
            StreamStatus::Unloaded => Err(PlayerError::engine("no stream loaded")),
            StreamStatus::Failed(reason) => Err(PlayerError::engine(reason)),
        }
    }

    fn pause(&mut self) -> Result<()> {
        self.rate = 0.0;
        info!(url = ?self.url.as_ref().map(Url::as_str), "Paused");
        Ok(())
    }

    fn unload(&mut self) {
        self.url = None;
        self.rate = 0.0;
        self.status = None;
    }

    fn is_paused(&self) -> bool {
        self.rate == 0.0
    }

    fn status(&self) -> StreamStatus {
        self.status.clone().unwrap_or(StreamStatus::Unloaded)
    }

    fn current_url(&self) -> Option<&Url> {
        self.url.as_ref()
    }
}
