//! Now-playing feed parsing
//!
//! Each channel publishes its own XML shape. The routing table below maps a
//! channel to the element paths holding the title, the artist and the
//! schedule announcement. Paths are matched from the top level of the
//! document, the first matching element wins, and several top-level elements
//! may coexist in one feed.

use crate::error::{Error, Result};
use crate::models::{Channel, NowPlayingFeed, Track};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::trace;

/// An attribute on the element found at a slash-separated path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributePath {
    pub element: &'static str,
    pub attribute: &'static str,
}

impl AttributePath {
    pub const fn new(element: &'static str, attribute: &'static str) -> Self {
        Self { element, attribute }
    }
}

/// Where a channel's feed keeps its fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedLayout {
    pub title: AttributePath,
    pub artist: AttributePath,
    pub announcement: AttributePath,
}

const ANNOUNCEMENT: AttributePath = AttributePath::new("Schedule/Event/Announcement", "Display");

const SCHEDULE_LAYOUT: FeedLayout = FeedLayout {
    title: AttributePath::new("Schedule/Event/Song", "title"),
    artist: AttributePath::new("Schedule/Event/Song/Artist", "name"),
    announcement: ANNOUNCEMENT,
};

const PLAYLIST_LAYOUT: FeedLayout = FeedLayout {
    title: AttributePath::new("Playlist/song", "title"),
    artist: AttributePath::new("Playlist/artist", "title"),
    announcement: ANNOUNCEMENT,
};

impl FeedLayout {
    /// Layout of the given channel's feed
    pub fn for_channel(channel: Channel) -> &'static FeedLayout {
        match channel {
            Channel::Stream => &SCHEDULE_LAYOUT,
            Channel::AMusic | Channel::Jazz => &PLAYLIST_LAYOUT,
        }
    }
}

/// Parse a now-playing feed for `channel`
///
/// Malformed XML gives a data transformation error; a missing title or
/// artist attribute gives [`Error::MissingAttribute`]. The announcement is
/// optional.
pub fn parse_feed(channel: Channel, xml: &str) -> Result<NowPlayingFeed> {
    let layout = FeedLayout::for_channel(channel);
    let [title, artist, announcement] =
        extract_attributes(xml, &[layout.title, layout.artist, layout.announcement])?;

    let title = title.ok_or(Error::MissingAttribute {
        element: layout.title.element,
        attribute: layout.title.attribute,
    })?;
    let artist = artist.ok_or(Error::MissingAttribute {
        element: layout.artist.element,
        attribute: layout.artist.attribute,
    })?;

    trace!(%channel, %title, %artist, ?announcement, "Parsed now-playing feed");

    Ok(NowPlayingFeed {
        track: Track::new(Some(title), Some(artist)),
        announcement,
    })
}

/// Walk the document once and collect the first value of each wanted attribute
fn extract_attributes<const N: usize>(
    xml: &str,
    wanted: &[AttributePath; N],
) -> Result<[Option<String>; N]> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut found: [Option<String>; N] = std::array::from_fn(|_| None);
    let mut stack: Vec<String> = Vec::new();
    let mut seen_element = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => {
                seen_element = true;
                stack.push(element_name(&e));
                collect(&reader, &e, &stack, wanted, &mut found)?;
            }
            Event::Empty(e) => {
                seen_element = true;
                stack.push(element_name(&e));
                collect(&reader, &e, &stack, wanted, &mut found)?;
                stack.pop();
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::data_transformation(format!(
            "unclosed element <{}>",
            stack.join("/")
        )));
    }
    if !seen_element {
        return Err(Error::data_transformation("document has no elements"));
    }

    Ok(found)
}

fn collect<const N: usize>(
    reader: &Reader<&[u8]>,
    element: &BytesStart<'_>,
    stack: &[String],
    wanted: &[AttributePath; N],
    found: &mut [Option<String>; N],
) -> Result<()> {
    let path = stack.join("/");

    for (slot, target) in found.iter_mut().zip(wanted.iter()) {
        if slot.is_some() || target.element != path {
            continue;
        }
        for attr in element.attributes() {
            let attr = attr.map_err(|e| Error::data_transformation(e.to_string()))?;
            if attr.key.as_ref() == target.attribute.as_bytes() {
                let value = attr
                    .decode_and_unescape_value(reader.decoder())
                    .map_err(xml_error)?;
                *slot = Some(value.into_owned());
                break;
            }
        }
    }

    Ok(())
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).to_string()
}

fn xml_error(err: quick_xml::Error) -> Error {
    Error::data_transformation(format!("malformed XML: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const PLAYLIST: &str = r#"<Playlist><song title="T"/><artist title="A"/></Playlist>"#;

    const SCHEDULE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Schedule>
  <Event>
    <Song title="Blue in Green">
      <Artist name="Miles Davis"/>
    </Song>
    <Announcement Display="Now On Air: Miles Davis"/>
  </Event>
</Schedule>"#;

    #[test]
    fn test_playlist_channels() {
        for channel in [Channel::AMusic, Channel::Jazz] {
            let feed = parse_feed(channel, PLAYLIST).unwrap();
            assert_eq!(feed.track, Track::new(Some("T"), Some("A")));
            assert_eq!(feed.announcement, None);
        }
    }

    #[test]
    fn test_stream_uses_schedule_layout() {
        let feed = parse_feed(Channel::Stream, SCHEDULE).unwrap();
        assert_eq!(feed.track.title(), "Blue in Green");
        assert_eq!(feed.track.artist(), "Miles Davis");
        assert_eq!(
            feed.announcement.as_deref(),
            Some("Now On Air: Miles Davis")
        );
    }

    #[test]
    fn test_layouts_are_not_interchangeable() {
        let err = parse_feed(Channel::Stream, PLAYLIST).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkDataInconsistency);

        let err = parse_feed(Channel::AMusic, SCHEDULE).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingAttribute {
                element: "Playlist/song",
                attribute: "title"
            }
        ));
    }

    #[test]
    fn test_announcement_in_second_root() {
        let xml = r#"<Playlist><song title="T"/><artist title="A"/></Playlist>
<Schedule><Event><Announcement Display="Ad break"/></Event></Schedule>"#;
        let feed = parse_feed(Channel::AMusic, xml).unwrap();
        assert_eq!(feed.announcement.as_deref(), Some("Ad break"));
    }

    #[test]
    fn test_missing_artist_attribute() {
        let xml = r#"<Playlist><song title="T"/><artist/></Playlist>"#;
        let err = parse_feed(Channel::Jazz, xml).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingAttribute {
                attribute: "title",
                element: "Playlist/artist"
            }
        ));
    }

    #[test]
    fn test_blank_attributes_become_placeholder() {
        let xml = r#"<Playlist><song title=""/><artist title="  "/></Playlist>"#;
        let feed = parse_feed(Channel::AMusic, xml).unwrap();
        assert_eq!(feed.track.title(), "--");
        assert_eq!(feed.track.artist(), "--");
    }

    #[test]
    fn test_first_match_wins_and_entities_unescaped() {
        let xml = r#"<Playlist>
  <song title="Rock &amp; Roll"/>
  <song title="Second"/>
  <artist title="Led Zeppelin"/>
</Playlist>"#;
        let feed = parse_feed(Channel::AMusic, xml).unwrap();
        assert_eq!(feed.track.title(), "Rock & Roll");
    }

    #[test]
    fn test_nested_elements_do_not_match_top_level_paths() {
        let xml = r#"<Root><Playlist><song title="T"/><artist title="A"/></Playlist></Root>"#;
        assert!(parse_feed(Channel::AMusic, xml).is_err());
    }

    #[test]
    fn test_malformed_xml() {
        for xml in [
            "<Playlist><song title=\"T\"></Playlist>",
            "<Playlist><song title=\"T\"/>",
            "",
            "plain text",
        ] {
            let err = parse_feed(Channel::AMusic, xml).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DataTransformation, "input: {xml:?}");
        }
    }
}
