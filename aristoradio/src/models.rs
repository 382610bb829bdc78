//! Data models for the Radio Aristocrats channels and feeds

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Value shown in place of a missing or blank title/artist
pub const TRACK_PLACEHOLDER: &str = "--";

// ============================================================================
// Channels and qualities
// ============================================================================

/// One of the three fixed radio channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// The main live stream
    Stream,
    /// A-Music
    AMusic,
    /// A-Jazz
    Jazz,
}

impl Channel {
    /// All channels in page order
    pub const ALL: [Channel; 3] = [Channel::Stream, Channel::AMusic, Channel::Jazz];

    /// Page index of the channel
    pub fn index(self) -> usize {
        match self {
            Self::Stream => 0,
            Self::AMusic => 1,
            Self::Jazz => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Stream => "Radio Aristocrats",
            Self::AMusic => "A-Music",
            Self::Jazz => "A-Jazz",
        }
    }

    /// File name of the now-playing feed, relative to the feed base URL
    pub fn feed_path(self) -> &'static str {
        match self {
            Self::Stream => "NowOnAir.xml",
            Self::AMusic => "nowplaying-amusic.xml",
            Self::Jazz => "nowplaying-ajazz.xml",
        }
    }

    /// Mount point of the audio stream, relative to the stream base URL
    ///
    /// Jazz has a single bitrate server-side, so both qualities share a mount.
    pub fn stream_path(self, quality: Quality) -> &'static str {
        match (self, quality) {
            (Self::Stream, Quality::Best) => "live2",
            (Self::Stream, Quality::Edge) => "live2-64",
            (Self::AMusic, Quality::Best) => "amusic-128",
            (Self::AMusic, Quality::Edge) => "amusic-64",
            (Self::Jazz, _) => "ajazz",
        }
    }

    /// Qualities a page offers for this channel
    pub fn qualities(self) -> &'static [Quality] {
        match self {
            Self::Jazz => &[Quality::Best],
            _ => &[Quality::Best, Quality::Edge],
        }
    }

    pub fn supports(self, quality: Quality) -> bool {
        self.qualities().contains(&quality)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stream" | "live" | "aristocrats" => Ok(Self::Stream),
            "amusic" | "a-music" => Ok(Self::AMusic),
            "jazz" | "ajazz" | "a-jazz" => Ok(Self::Jazz),
            other => Err(format!("unknown channel: {other}")),
        }
    }
}

/// Stream bitrate tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// Highest bitrate (128 kbps)
    #[default]
    Best,
    /// Low bitrate for cellular links (64 kbps)
    Edge,
}

impl Quality {
    pub fn bitrate_kbps(self) -> u32 {
        match self {
            Self::Best => 128,
            Self::Edge => 64,
        }
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best" => Ok(Self::Best),
            "edge" => Ok(Self::Edge),
            other => Err(format!("unknown quality: {other}")),
        }
    }
}

/// What is loaded into the shared player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaybackState {
    pub channel: Channel,
    pub quality: Quality,
}

impl PlaybackState {
    pub fn new(channel: Channel, quality: Quality) -> Self {
        Self { channel, quality }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} kbps)", self.channel, self.quality.bitrate_kbps())
    }
}

// ============================================================================
// Tracks
// ============================================================================

/// A song as announced by a now-playing feed
///
/// Absent or blank values are replaced by [`TRACK_PLACEHOLDER`] at
/// construction; the fields cannot change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    title: String,
    artist: String,
}

impl Track {
    pub fn new<T, A>(title: Option<T>, artist: Option<A>) -> Self
    where
        T: Into<String>,
        A: Into<String>,
    {
        Self {
            title: normalize(title.map(Into::into)),
            artist: normalize(artist.map(Into::into)),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    /// Whether the artist is known (artwork lookups need one)
    pub fn has_artist(&self) -> bool {
        self.artist != TRACK_PLACEHOLDER
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

fn normalize(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => TRACK_PLACEHOLDER.to_string(),
    }
}

/// Raw result of parsing a now-playing feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlayingFeed {
    pub track: Track,
    /// `Display` text of the schedule announcement, if any
    pub announcement: Option<String>,
}

impl NowPlayingFeed {
    /// Whether the feed reports a concrete song
    ///
    /// A missing announcement counts as on air; a present one must contain
    /// `marker`.
    pub fn is_on_air(&self, marker: &str) -> bool {
        self.announcement
            .as_deref()
            .map_or(true, |message| message.contains(marker))
    }
}
