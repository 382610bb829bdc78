//! Per-channel page state.
//!
//! A page shows one channel. It keeps its own quality choice, which may
//! differ from what the coordinator has loaded, mirrors the play icon from
//! coordinator events while visible, and renders its own track fetches.

use aristoradio::{Channel, ErrorKind, FetchResult, PlaybackState, Quality, Track};
use crossbeam_channel::Receiver;
use tracing::{debug, trace};

use crate::coordinator::{PlaybackCoordinator, PlayerStatus};
use crate::errors::Result;
use crate::events::PlaybackEvent;
use crate::locale::{Language, LocalizableString};
use crate::now_playing::TrackDisplay;

/// Issued when a page starts a fetch; only the newest ticket is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Blocking alert to show for a failed fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageAlert {
    pub kind: ErrorKind,
    pub detail: String,
}

impl PageAlert {
    pub fn title(&self, language: Language) -> &'static str {
        LocalizableString::Error.text(language)
    }

    pub fn message(&self, language: Language) -> &'static str {
        match self.kind {
            ErrorKind::NetworkRequest => LocalizableString::NoInternetConnection.text(language),
            _ => LocalizableString::NoTrackInfoErrorMessage.text(language),
        }
    }
}

pub struct ChannelPage {
    channel: Channel,
    quality: Quality,
    /// Set once the user picked a quality on this page.
    chosen: bool,
    playing: bool,
    display: TrackDisplay,
    issued: u64,
    applied: u64,
    events: Option<Receiver<PlaybackEvent>>,
}

impl ChannelPage {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            quality: Quality::Best,
            chosen: false,
            playing: false,
            display: TrackDisplay::Placeholder,
            issued: 0,
            applied: 0,
            events: None,
        }
    }

    /// One page per channel, in page order.
    pub fn all() -> Vec<ChannelPage> {
        Channel::ALL.into_iter().map(ChannelPage::new).collect()
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// State this page would ask the coordinator to load.
    pub fn state(&self) -> PlaybackState {
        PlaybackState::new(self.channel, self.quality)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn display(&self) -> &TrackDisplay {
        &self.display
    }

    pub fn quality_options(&self) -> &'static [Quality] {
        self.channel.qualities()
    }

    pub fn quality_label(&self, quality: Quality, language: Language) -> String {
        match quality {
            Quality::Best => LocalizableString::MusicQualityBest.text(language).to_string(),
            Quality::Edge => format!("{} kbps", quality.bitrate_kbps()),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.events.is_some()
    }

    // ------------------------------------------------------------------
    // Visibility lifecycle
    // ------------------------------------------------------------------

    /// Subscribe to coordinator events and resync the play icon.
    ///
    /// The page adopts the loaded quality of its channel while it plays, or
    /// when no quality was picked on the page yet.
    ///
    /// Returns the ticket for the fetch a page runs when it appears.
    pub fn appear(&mut self, coordinator: &PlaybackCoordinator) -> FetchTicket {
        if self.events.is_none() {
            self.events = Some(coordinator.subscribe());
        }
        let status = coordinator.status();
        if let Some(state) = status.state() {
            if state.channel == self.channel && (!self.chosen || status.is_playing()) {
                self.quality = state.quality;
            }
        }
        self.sync(status);
        self.begin_fetch()
    }

    /// Drop the subscription.
    pub fn disappear(&mut self) {
        self.events = None;
    }

    // ------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------

    pub fn tap_play(&mut self, coordinator: &PlaybackCoordinator) -> Result<()> {
        coordinator.on_play_intent(self.state())?;
        self.sync(coordinator.status());
        Ok(())
    }

    /// Record a quality choice and forward it to the coordinator.
    ///
    /// Qualities the channel does not offer are ignored.
    pub fn select_quality(
        &mut self,
        quality: Quality,
        coordinator: &PlaybackCoordinator,
    ) -> Result<bool> {
        if !self.channel.supports(quality) {
            debug!(channel = %self.channel, ?quality, "Quality not offered");
            return Ok(false);
        }
        self.quality = quality;
        self.chosen = true;
        coordinator.on_quality_intent(self.state())
    }

    // ------------------------------------------------------------------
    // Events and fetches
    // ------------------------------------------------------------------

    /// Drain pending coordinator events; returns how many were handled.
    pub fn process_events(&mut self, coordinator: &PlaybackCoordinator) -> usize {
        let Some(events) = &self.events else {
            return 0;
        };
        let pending: Vec<PlaybackEvent> = events.try_iter().collect();
        let mut resync = false;
        for event in &pending {
            trace!(channel = %self.channel, ?event, "Page event");
            match event {
                PlaybackEvent::PlayStateChanged { status } => self.sync(*status),
                PlaybackEvent::ResyncRequested => resync = true,
                _ => {}
            }
        }
        if resync {
            self.sync(coordinator.status());
        }
        pending.len()
    }

    fn sync(&mut self, status: PlayerStatus) {
        self.playing = status.is_playing_channel(self.channel);
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// Render a fetch result.
    ///
    /// Results older than the last applied one are dropped. Transport and
    /// shape failures return an alert; "no track info" renders inline.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: &FetchResult<Track>,
    ) -> Option<PageAlert> {
        if ticket.0 <= self.applied {
            debug!(channel = %self.channel, ticket = ticket.0, "Dropping stale page fetch");
            return None;
        }
        self.applied = ticket.0;
        self.display = TrackDisplay::from_result(result);

        match result {
            Err(e) if e.is_alert_worthy() => Some(PageAlert {
                kind: e.kind(),
                detail: e.to_string(),
            }),
            _ => None,
        }
    }

    /// Title and artist lines.
    pub fn lines(&self, language: Language) -> (String, String) {
        self.display.lines(self.channel, language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aristoradio::Error;

    #[test]
    fn newest_fetch_wins() {
        let mut page = ChannelPage::new(Channel::AMusic);
        let first = page.begin_fetch();
        let second = page.begin_fetch();

        let late: FetchResult<Track> = Ok(Track::new(Some("Old"), Some("A")));
        let fresh: FetchResult<Track> = Ok(Track::new(Some("New"), Some("B")));

        assert!(page.apply_fetch(second, &fresh).is_none());
        assert!(page.apply_fetch(first, &late).is_none());
        assert_eq!(page.display().track().map(Track::title), Some("New"));
    }

    #[test]
    fn alert_policy() {
        let mut page = ChannelPage::new(Channel::Stream);

        let ticket = page.begin_fetch();
        let idle: FetchResult<Track> = Err(Error::FailedToObtainTrackInfo("Ad break".into()));
        assert!(page.apply_fetch(ticket, &idle).is_none());
        assert_eq!(page.lines(Language::Russian).0, "Ad break");

        let ticket = page.begin_fetch();
        let broken: FetchResult<Track> = Err(Error::inconsistency("no title"));
        let alert = page.apply_fetch(ticket, &broken).unwrap();
        assert_eq!(alert.kind, ErrorKind::NetworkDataInconsistency);
        assert_eq!(alert.title(Language::Ukrainian), "Помилка");

        let ticket = page.begin_fetch();
        let artwork: FetchResult<Track> = Err(Error::FailedToObtainArtworkUrl("A".into()));
        assert!(page.apply_fetch(ticket, &artwork).is_none());
    }

    #[test]
    fn jazz_page_ignores_edge() {
        let page = ChannelPage::new(Channel::Jazz);
        assert_eq!(page.quality_options(), &[Quality::Best]);
        assert_eq!(
            page.quality_label(Quality::Best, Language::Russian),
            "Лучшее"
        );
    }
}
