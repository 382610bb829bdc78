//! Radio Aristocrats client library
//!
//! This crate fetches what is on air on the three Radio Aristocrats channels
//! and the artwork of the current artist.
//!
//! # Features
//!
//! - **Now playing**: per-channel XML feeds, parsed through a routing table
//!   that keeps each channel's document shape
//! - **Stream URLs**: the fixed `(channel, quality)` mount points
//! - **Artwork**: two-hop lookup (artist info JSON, then image download)
//! - **Configuration Extension**: typed settings on `aristoconfig::Config`
//!
//! # Example
//!
//! ```no_run
//! use aristoradio::{AristocratsClient, Channel, ErrorKind};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AristocratsClient::new().await?;
//!
//!     match client.fetch_track(Channel::Stream).await {
//!         Ok(track) => println!("Now: {track}"),
//!         Err(e) if e.kind() == ErrorKind::FailedToObtainTrackInfo => {
//!             println!("Nothing on air: {}", e.announcement().unwrap_or(""))
//!         }
//!         Err(e) => return Err(e.into()),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Error classes
//!
//! Every failure maps to an [`ErrorKind`]. Transport and payload-shape
//! failures are meant to be surfaced to the user, "no track info" is the
//! normal idle state of a channel, and artwork failures fall back to a
//! default image.

pub mod artwork;
pub mod client;
pub mod error;
pub mod models;
pub mod parser;

#[cfg(feature = "aristoconfig")]
pub mod config_ext;

// Re-exports
pub use artwork::{ArtistArtwork, ArtistImage, ArtworkClient, ArtworkClientBuilder};
pub use client::{AristocratsClient, ClientBuilder, ON_AIR_MARKER};
pub use error::{Error, ErrorKind, FetchResult, Result};
pub use models::{Channel, NowPlayingFeed, PlaybackState, Quality, Track, TRACK_PLACEHOLDER};
pub use parser::{parse_feed, FeedLayout};

#[cfg(feature = "aristoconfig")]
pub use config_ext::AristocratsConfigExt;
