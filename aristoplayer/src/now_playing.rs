//! Now-playing display values.
//!
//! Every update builds a new [`NowPlayingInfo`]; published values are never
//! patched in place.

use std::sync::Arc;

use aristoradio::{ArtistArtwork, Channel, Error, ErrorKind, FetchResult, PlaybackState, Track};
use image::DynamicImage;

use crate::locale::{Language, LocalizableString};

/// What the track lines show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackDisplay {
    /// Set on every stream change until the first fetch lands.
    Placeholder,
    Resolved(Track),
    /// The feed announces no song; carries the announcement.
    NoTrackInfo(String),
    /// The fetch failed.
    Unavailable(ErrorKind),
}

impl TrackDisplay {
    pub fn from_result(result: &FetchResult<Track>) -> Self {
        match result {
            Ok(track) => TrackDisplay::Resolved(track.clone()),
            Err(Error::FailedToObtainTrackInfo(message)) => {
                TrackDisplay::NoTrackInfo(message.clone())
            }
            Err(e) => TrackDisplay::Unavailable(e.kind()),
        }
    }

    pub fn track(&self) -> Option<&Track> {
        match self {
            TrackDisplay::Resolved(track) => Some(track),
            _ => None,
        }
    }

    /// Title and artist lines for `channel` in `language`.
    pub fn lines(&self, channel: Channel, language: Language) -> (String, String) {
        match self {
            TrackDisplay::Placeholder => (
                LocalizableString::OnAir.text(language).to_string(),
                channel.display_name().to_string(),
            ),
            TrackDisplay::Resolved(track) => (track.title().to_string(), track.artist().to_string()),
            TrackDisplay::NoTrackInfo(message) if !message.trim().is_empty() => (
                message.clone(),
                LocalizableString::UnknownArtist.text(language).to_string(),
            ),
            TrackDisplay::NoTrackInfo(_) => (
                LocalizableString::UnknownTrack.text(language).to_string(),
                LocalizableString::UnknownArtist.text(language).to_string(),
            ),
            TrackDisplay::Unavailable(_) => (
                LocalizableString::NoTrackInfoErrorMessage
                    .text(language)
                    .to_string(),
                LocalizableString::UnknownArtist.text(language).to_string(),
            ),
        }
    }
}

/// Artwork shown next to the track.
#[derive(Clone, Debug, Default)]
pub enum Artwork {
    /// The bundled station image.
    #[default]
    Default,
    Artist {
        artist: String,
        url: String,
        image: Arc<DynamicImage>,
    },
}

impl Artwork {
    pub fn artist(&self) -> Option<&str> {
        match self {
            Artwork::Default => None,
            Artwork::Artist { artist, .. } => Some(artist),
        }
    }
}

impl From<ArtistArtwork> for Artwork {
    fn from(artwork: ArtistArtwork) -> Self {
        Artwork::Artist {
            artist: artwork.artist,
            url: artwork.url,
            image: artwork.image,
        }
    }
}

// Images are identified by their source URL.
impl PartialEq for Artwork {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Artwork::Default, Artwork::Default) => true,
            (
                Artwork::Artist { artist, url, .. },
                Artwork::Artist {
                    artist: other_artist,
                    url: other_url,
                    ..
                },
            ) => artist == other_artist && url == other_url,
            _ => false,
        }
    }
}

impl Eq for Artwork {}

/// Lock-screen style now-playing record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NowPlayingInfo {
    /// Stream generation this record belongs to.
    pub generation: u64,
    /// `None` once the coordinator is stopped.
    pub state: Option<PlaybackState>,
    pub track: TrackDisplay,
    pub artwork: Artwork,
}

impl NowPlayingInfo {
    /// First phase of a stream change.
    pub fn placeholder(state: PlaybackState, generation: u64) -> Self {
        Self {
            generation,
            state: Some(state),
            track: TrackDisplay::Placeholder,
            artwork: Artwork::Default,
        }
    }

    pub fn idle(generation: u64) -> Self {
        Self {
            generation,
            state: None,
            track: TrackDisplay::Placeholder,
            artwork: Artwork::Default,
        }
    }

    pub fn with_track(&self, track: TrackDisplay) -> Self {
        Self {
            track,
            ..self.clone()
        }
    }

    pub fn with_artwork(&self, artwork: Artwork) -> Self {
        Self {
            artwork,
            ..self.clone()
        }
    }

    /// Title and artist lines; empty when idle.
    pub fn lines(&self, language: Language) -> (String, String) {
        match self.state {
            Some(state) => self.track.lines(state.channel, language),
            None => (String::new(), String::new()),
        }
    }
}

/// Artwork lookup to run after a track was applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtworkRequest {
    pub generation: u64,
    pub artist: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use aristoradio::Quality;

    #[test]
    fn display_from_results() {
        let ok: FetchResult<Track> = Ok(Track::new(Some("T"), Some("A")));
        assert_eq!(
            TrackDisplay::from_result(&ok).track().map(Track::title),
            Some("T")
        );

        let idle: FetchResult<Track> = Err(Error::FailedToObtainTrackInfo("Ad break".into()));
        assert_eq!(
            TrackDisplay::from_result(&idle),
            TrackDisplay::NoTrackInfo("Ad break".into())
        );

        let broken: FetchResult<Track> = Err(Error::data_transformation("bad"));
        assert_eq!(
            TrackDisplay::from_result(&broken),
            TrackDisplay::Unavailable(ErrorKind::DataTransformation)
        );
    }

    #[test]
    fn placeholder_lines_are_localized() {
        let info = NowPlayingInfo::placeholder(PlaybackState::new(Channel::Jazz, Quality::Best), 1);
        let (title, artist) = info.lines(Language::Ukrainian);
        assert_eq!(title, "Прямий ефір");
        assert_eq!(artist, "A-Jazz");

        let (title, _) = info
            .with_track(TrackDisplay::Unavailable(ErrorKind::NetworkRequest))
            .lines(Language::Russian);
        assert_eq!(title, "Упс, что-то пошло не так!");

        assert_eq!(NowPlayingInfo::idle(2).lines(Language::Russian).0, "");
    }

    #[test]
    fn updates_build_new_values() {
        let info = NowPlayingInfo::placeholder(PlaybackState::new(Channel::Stream, Quality::Edge), 3);
        let resolved = info.with_track(TrackDisplay::Resolved(Track::new(Some("T"), Some("A"))));
        assert_eq!(info.track, TrackDisplay::Placeholder);
        assert_eq!(resolved.generation, 3);
        assert_ne!(info, resolved);
    }
}
