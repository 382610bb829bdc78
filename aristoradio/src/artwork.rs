//! Artist artwork lookup
//!
//! Artwork is resolved in two hops: an `artist.getInfo` call on a
//! Last.fm-compatible API returns size-tagged image URLs, then the
//! `extralarge` image is downloaded and decoded. Each hop reports its own
//! failure; callers fall back to their default artwork on any error.

use crate::error::{Error, FetchResult, Result};
use image::DynamicImage;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default artist info endpoint
pub const DEFAULT_API_BASE: &str = "http://ws.audioscrobbler.com/2.0/";

/// Size tag of the image variant used as artwork
pub const ARTWORK_SIZE: &str = "extralarge";

/// One size-tagged image entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtistImage {
    #[serde(default)]
    pub size: String,
    #[serde(rename = "#text", alias = "url", default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct ArtistInfo {
    #[serde(default)]
    image: Option<Vec<ArtistImage>>,
}

#[derive(Debug, Deserialize)]
struct ArtistInfoResponse {
    #[serde(default)]
    artist: Option<ArtistInfo>,
    #[serde(default)]
    error: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

/// Decoded artwork for an artist
#[derive(Debug, Clone)]
pub struct ArtistArtwork {
    pub artist: String,
    pub url: String,
    pub image: Arc<DynamicImage>,
}

/// Pick the `extralarge` entry among size-tagged images
pub fn select_artwork_url(artist: &str, images: &[ArtistImage]) -> Result<String> {
    images
        .iter()
        .find(|image| image.size == ARTWORK_SIZE && !image.url.trim().is_empty())
        .map(|image| image.url.clone())
        .ok_or_else(|| Error::FailedToObtainArtworkUrl(artist.to_string()))
}

/// Interpret an `artist.getInfo` JSON body
pub fn parse_artist_info(artist: &str, body: &[u8]) -> Result<String> {
    let response: ArtistInfoResponse = serde_json::from_slice(body)?;

    if let Some(code) = response.error {
        return Err(Error::Api {
            code,
            message: response.message.unwrap_or_default(),
        });
    }

    let images = response
        .artist
        .and_then(|info| info.image)
        .ok_or_else(|| Error::inconsistency(format!("no image list for artist {artist}")))?;

    select_artwork_url(artist, &images)
}

/// Client for the artist artwork API
#[derive(Debug, Clone)]
pub struct ArtworkClient {
    client: Client,
    api_base: Url,
    api_key: String,
    timeout: Duration,
}

impl ArtworkClient {
    /// Create a builder for configuring the client
    pub fn builder() -> ArtworkClientBuilder {
        ArtworkClientBuilder::default()
    }

    /// Whether lookups can be made at all
    pub fn is_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Build the `artist.getInfo` URL for an artist
    pub fn artist_info_url(&self, artist: &str) -> Url {
        let mut url = self.api_base.clone();
        url.query_pairs_mut()
            .append_pair("method", "artist.getInfo")
            .append_pair("artist", artist)
            .append_pair("api_key", &self.api_key)
            .append_pair("autocorrect", "1")
            .append_pair("format", "json");
        url
    }

    /// First hop: resolve the artwork URL of an artist
    pub async fn fetch_artwork_url(&self, artist: &str) -> FetchResult<String> {
        if !self.is_enabled() {
            return Err(Error::Config(anyhow::anyhow!(
                "artwork API key is not configured"
            )));
        }

        debug!(artist, "Looking up artist artwork");
        let response = self
            .client
            .get(self.artist_info_url(artist))
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        // API errors come with a JSON body and a 4xx status
        match parse_artist_info(artist, &body) {
            Err(e @ Error::Api { .. }) => Err(e),
            _ if !status.is_success() => Err(Error::HttpStatus {
                url: self.api_base.to_string(),
                status: status.as_u16(),
            }),
            result => result,
        }
    }

    /// Second hop: download and decode an image
    pub async fn download_image(&self, url: &str) -> FetchResult<Arc<DynamicImage>> {
        let response = self
            .client
            .get(Url::parse(url)?)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| Error::data_transformation(format!("image decoding aborted: {e}")))??;

        Ok(Arc::new(image))
    }

    /// Both hops for an artist
    pub async fn fetch_artwork(&self, artist: &str) -> FetchResult<ArtistArtwork> {
        let url = self.fetch_artwork_url(artist).await?;
        let image = self.download_image(&url).await.inspect_err(|e| {
            warn!(artist, %url, error = %e, "Artwork download failed");
        })?;

        Ok(ArtistArtwork {
            artist: artist.to_string(),
            url,
            image,
        })
    }
}

/// Builder for configuring an ArtworkClient
#[derive(Debug)]
pub struct ArtworkClientBuilder {
    client: Option<Client>,
    api_base: String,
    api_key: String,
    timeout: Duration,
}

impl Default for ArtworkClientBuilder {
    fn default() -> Self {
        Self {
            client: None,
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(crate::client::DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ArtworkClientBuilder {
    /// Share an existing HTTP client (connection pool)
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ArtworkClient> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .user_agent(crate::client::DEFAULT_USER_AGENT)
                .timeout(self.timeout)
                .build()?,
        };

        Ok(ArtworkClient {
            client,
            api_base: Url::parse(&self.api_base)?,
            api_key: self.api_key.trim().to_string(),
            timeout: self.timeout,
        })
    }
}
