//! HTTP client for the Radio Aristocrats now-playing feeds
//!
//! # Example
//!
//! ```no_run
//! use aristoradio::{AristocratsClient, Channel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AristocratsClient::new().await?;
//!
//!     let track = client.fetch_track(Channel::AMusic).await?;
//!     println!("{} - {}", track.artist(), track.title());
//!
//!     Ok(())
//! }
//! ```

use crate::error::{Error, FetchResult, Result};
use crate::models::{Channel, NowPlayingFeed, PlaybackState, Track};
use crate::parser::parse_feed;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Base URL of the now-playing feeds
pub const DEFAULT_FEED_BASE: &str = "http://aristocrats.fm/service/";

/// Base URL of the audio streams
pub const DEFAULT_STREAM_BASE: &str = "http://144.76.79.38:8000/";

/// Substring of the announcement marking that a real song is playing
pub const ON_AIR_MARKER: &str = "Now On Air:";

/// Default timeout for HTTP requests (15 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "RadioAristocrats/0.1.0 (aristoradio)";

/// Radio Aristocrats feed client
///
/// Stateless: every call performs exactly one request and never retries.
#[derive(Debug, Clone)]
pub struct AristocratsClient {
    pub(crate) client: Client,
    feed_base: Url,
    stream_base: Url,
    on_air_marker: String,
    timeout: Duration,
}

impl AristocratsClient {
    /// Create a new client with default settings
    pub async fn new() -> Result<Self> {
        Self::builder().build().await
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn feed_base(&self) -> &Url {
        &self.feed_base
    }

    pub fn on_air_marker(&self) -> &str {
        &self.on_air_marker
    }

    /// Get the internal HTTP client
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// URL of the channel's now-playing feed
    pub fn feed_url(&self, channel: Channel) -> Result<Url> {
        Ok(self.feed_base.join(channel.feed_path())?)
    }

    /// URL of the audio stream for a channel and quality
    pub fn stream_url(&self, state: PlaybackState) -> Result<Url> {
        Ok(self
            .stream_base
            .join(state.channel.stream_path(state.quality))?)
    }

    // ========================================================================
    // Now playing
    // ========================================================================

    /// Fetch and parse the channel's feed without interpreting the announcement
    pub async fn fetch_now_playing(&self, channel: Channel) -> Result<NowPlayingFeed> {
        let url = self.feed_url(channel)?;
        debug!(%channel, %url, "Fetching now-playing feed");

        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%channel, status = status.as_u16(), "Now-playing feed answered with an error");
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let body = String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::data_transformation(format!("feed is not UTF-8: {e}")))?;

        parse_feed(channel, &body)
    }

    /// Fetch the song currently on air
    ///
    /// Fails with [`Error::FailedToObtainTrackInfo`] when the feed carries an
    /// announcement without the on-air marker, even if a title and an artist
    /// were parsed.
    pub async fn fetch_track(&self, channel: Channel) -> FetchResult<Track> {
        let feed = self.fetch_now_playing(channel).await?;
        self.interpret(feed)
    }

    /// Decide between a track and a "no track info" failure
    pub fn interpret(&self, feed: NowPlayingFeed) -> FetchResult<Track> {
        if feed.is_on_air(&self.on_air_marker) {
            return Ok(feed.track);
        }
        let message = feed.announcement.unwrap_or_default();
        debug!(%message, "Feed announces no track");
        Err(Error::FailedToObtainTrackInfo(message))
    }
}

/// Builder for configuring an AristocratsClient
#[derive(Debug)]
pub struct ClientBuilder {
    client: Option<Client>,
    feed_base: String,
    stream_base: String,
    on_air_marker: String,
    timeout: Duration,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            feed_base: DEFAULT_FEED_BASE.to_string(),
            stream_base: DEFAULT_STREAM_BASE.to_string(),
            on_air_marker: ON_AIR_MARKER.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom HTTP client
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the base URL the feed file names are resolved against
    pub fn feed_base(mut self, url: impl Into<String>) -> Self {
        self.feed_base = url.into();
        self
    }

    /// Set the base URL the stream mount points are resolved against
    pub fn stream_base(mut self, url: impl Into<String>) -> Self {
        self.stream_base = url.into();
        self
    }

    pub fn on_air_marker(mut self, marker: impl Into<String>) -> Self {
        self.on_air_marker = marker.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client
    pub async fn build(self) -> Result<AristocratsClient> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(&self.user_agent)
                .timeout(self.timeout)
                .build()?,
        };

        Ok(AristocratsClient {
            client,
            feed_base: parse_base(&self.feed_base)?,
            stream_base: parse_base(&self.stream_base)?,
            on_air_marker: self.on_air_marker,
            timeout: self.timeout,
        })
    }
}

/// Parse a base URL, making sure relative joins append to its path
fn parse_base(base: &str) -> Result<Url> {
    if base.ends_with('/') {
        Ok(Url::parse(base)?)
    } else {
        Ok(Url::parse(&format!("{base}/"))?)
    }
}
