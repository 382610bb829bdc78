//! Single owner of the active stream.
//!
//! `PlaybackCoordinator` is built once by the application and shared by
//! cloning the handle. It holds the only mutable "what is loaded" state,
//! turns page intents, remote commands, interruptions and connectivity
//! transitions into engine calls, and publishes the now-playing record.
//!
//! Each stream change bumps a generation counter. Fetch results are applied
//! with the generation they were started under, and results from an older
//! generation are dropped.

use std::sync::{Arc, Mutex, MutexGuard};

use aristoradio::{
    AristocratsClient, ArtistArtwork, Channel, FetchResult, PlaybackState, Quality, Track,
};
use tracing::{debug, info, warn};
use url::Url;

use crate::engine::{PlaybackEngine, StreamStatus};
use crate::errors::Result;
use crate::events::{PlaybackEvent, PlaybackEventBus};
use crate::now_playing::{Artwork, ArtworkRequest, NowPlayingInfo, TrackDisplay};
use crate::reachability::{NetworkStatus, QualityExt};

/// Coordinator state as seen by observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerStatus {
    /// No stream loaded.
    Idle,
    Paused(PlaybackState),
    Playing(PlaybackState),
}

impl PlayerStatus {
    pub fn state(&self) -> Option<PlaybackState> {
        match self {
            PlayerStatus::Idle => None,
            PlayerStatus::Paused(state) | PlayerStatus::Playing(state) => Some(*state),
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlayerStatus::Playing(_))
    }

    /// Whether `channel` is the one currently playing.
    pub fn is_playing_channel(&self, channel: Channel) -> bool {
        matches!(self, PlayerStatus::Playing(state) if state.channel == channel)
    }
}

/// Lock-screen transport commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoteCommand {
    Play,
    Pause,
    TogglePlayPause,
}

/// Audio session interruption phases (phone call, alarm...).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interruption {
    Began,
    Ended,
}

struct Inner {
    engine: Box<dyn PlaybackEngine>,
    state: Option<PlaybackState>,
    generation: u64,
    now_playing: Arc<NowPlayingInfo>,
    /// Artist the current artwork was requested for.
    artwork_artist: Option<String>,
}

#[derive(Clone)]
pub struct PlaybackCoordinator {
    inner: Arc<Mutex<Inner>>,
    streams: AristocratsClient,
    bus: PlaybackEventBus,
}

impl PlaybackCoordinator {
    /// Load `channel` paused, at the quality matching `network`.
    pub fn new(
        engine: Box<dyn PlaybackEngine>,
        streams: AristocratsClient,
        channel: Channel,
        network: Option<NetworkStatus>,
    ) -> Result<Self> {
        let coordinator = Self {
            inner: Arc::new(Mutex::new(Inner {
                engine,
                state: None,
                generation: 0,
                now_playing: Arc::new(NowPlayingInfo::idle(0)),
                artwork_artist: None,
            })),
            streams,
            bus: PlaybackEventBus::new(),
        };
        coordinator.switch_to(PlaybackState::new(channel, Quality::for_network(network)))?;
        Ok(coordinator)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> &PlaybackEventBus {
        &self.bus
    }

    pub fn subscribe(&self) -> crossbeam_channel::Receiver<PlaybackEvent> {
        self.bus.subscribe()
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    /// `None` when idle.
    pub fn current_state(&self) -> Option<PlaybackState> {
        self.lock().state
    }

    pub fn status(&self) -> PlayerStatus {
        Self::status_of(&self.lock())
    }

    fn status_of(inner: &Inner) -> PlayerStatus {
        match inner.state {
            None => PlayerStatus::Idle,
            Some(state) if inner.engine.is_paused() => PlayerStatus::Paused(state),
            Some(state) => PlayerStatus::Playing(state),
        }
    }

    /// True when idle or paused.
    pub fn is_paused(&self) -> bool {
        !self.status().is_playing()
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Generation and state to start a fetch under.
    pub fn snapshot(&self) -> Option<(u64, PlaybackState)> {
        let inner = self.lock();
        inner.state.map(|state| (inner.generation, state))
    }

    pub fn stream_status(&self) -> StreamStatus {
        self.lock().engine.status()
    }

    pub fn stream_url(&self) -> Option<Url> {
        self.lock().engine.current_url().cloned()
    }

    pub fn now_playing(&self) -> Arc<NowPlayingInfo> {
        self.lock().now_playing.clone()
    }

    // ------------------------------------------------------------------
    // Transport primitives
    // ------------------------------------------------------------------

    pub fn play(&self) -> Result<()> {
        let mut inner = self.lock();
        if inner.state.is_none() {
            debug!("play() while idle, ignoring");
            return Ok(());
        }
        inner.engine.play()?;
        self.publish_status(&inner);
        Ok(())
    }

    pub fn pause(&self) -> Result<()> {
        let mut inner = self.lock();
        if inner.state.is_none() {
            debug!("pause() while idle, ignoring");
            return Ok(());
        }
        inner.engine.pause()?;
        self.publish_status(&inner);
        Ok(())
    }

    /// Replace the loaded stream; the new stream stays paused.
    ///
    /// Publishes the placeholder now-playing record right away; fetch
    /// results for the new generation refine it later.
    pub fn switch_to(&self, state: PlaybackState) -> Result<u64> {
        let mut inner = self.lock();
        self.switch_locked(&mut inner, state)
    }

    fn switch_locked(&self, inner: &mut Inner, state: PlaybackState) -> Result<u64> {
        let state = normalize(state);
        let url = self.streams.stream_url(state)?;

        inner.engine.unload();
        inner.state = None;
        inner.generation += 1;
        let generation = inner.generation;

        if let Err(e) = inner.engine.load(&url) {
            warn!(%url, error = %e, "Failed to load stream");
            inner.artwork_artist = None;
            inner.now_playing = Arc::new(NowPlayingInfo::idle(generation));
            self.bus.broadcast(PlaybackEvent::NowPlayingChanged {
                info: inner.now_playing.clone(),
            });
            self.publish_status(inner);
            return Err(e);
        }

        inner.state = Some(state);
        inner.artwork_artist = None;
        inner.now_playing = Arc::new(NowPlayingInfo::placeholder(state, generation));
        info!(%state, %url, generation, "Stream switched");

        self.bus
            .broadcast(PlaybackEvent::StreamChanged { state, generation });
        self.bus.broadcast(PlaybackEvent::NowPlayingChanged {
            info: inner.now_playing.clone(),
        });
        self.publish_status(inner);
        Ok(generation)
    }

    /// Unload the stream and go idle.
    pub fn stop(&self) {
        let mut inner = self.lock();
        if inner.state.is_none() {
            return;
        }
        inner.engine.unload();
        inner.state = None;
        inner.generation += 1;
        inner.artwork_artist = None;
        inner.now_playing = Arc::new(NowPlayingInfo::idle(inner.generation));
        info!("Playback stopped");

        self.bus.broadcast(PlaybackEvent::NowPlayingChanged {
            info: inner.now_playing.clone(),
        });
        self.publish_status(&inner);
    }

    fn publish_status(&self, inner: &Inner) {
        self.bus.broadcast(PlaybackEvent::PlayStateChanged {
            status: Self::status_of(inner),
        });
    }

    // ------------------------------------------------------------------
    // Page intents
    // ------------------------------------------------------------------

    /// Play button on a page showing `state`.
    ///
    /// Same channel toggles, except that a paused stream at another quality
    /// than the page's is reloaded at the page's quality and played. Another
    /// channel (or idle) switches to `state` and starts playing.
    pub fn on_play_intent(&self, state: PlaybackState) -> Result<()> {
        let mut inner = self.lock();
        let state = normalize(state);
        let paused = inner.engine.is_paused();
        let loaded = inner.state;
        match loaded {
            Some(current)
                if current.channel == state.channel && (current == state || !paused) =>
            {
                if paused {
                    inner.engine.play()?;
                } else {
                    inner.engine.pause()?;
                }
                self.publish_status(&inner);
            }
            _ => {
                self.switch_locked(&mut inner, state)?;
                inner.engine.play()?;
                self.publish_status(&inner);
            }
        }
        Ok(())
    }

    /// Quality switch on a page showing `state`.
    ///
    /// Only acts when that channel is the one playing. Returns whether the
    /// stream was replaced.
    pub fn on_quality_intent(&self, state: PlaybackState) -> Result<bool> {
        let mut inner = self.lock();
        let state = normalize(state);
        let loaded = inner.state;
        match loaded {
            Some(current)
                if current.channel == state.channel && !inner.engine.is_paused() =>
            {
                if current == state {
                    return Ok(false);
                }
                self.switch_locked(&mut inner, state)?;
                inner.engine.play()?;
                self.publish_status(&inner);
                Ok(true)
            }
            _ => {
                debug!(%state, "Quality change recorded by page only");
                Ok(false)
            }
        }
    }

    // ------------------------------------------------------------------
    // Platform events
    // ------------------------------------------------------------------

    pub fn handle_remote_command(&self, command: RemoteCommand) -> Result<()> {
        debug!(?command, "Remote command");
        match command {
            RemoteCommand::Play => self.play(),
            RemoteCommand::Pause => self.pause(),
            RemoteCommand::TogglePlayPause => {
                if self.is_paused() {
                    self.play()
                } else {
                    self.pause()
                }
            }
        }
    }

    /// The coordinator never resumes on its own after an interruption.
    pub fn handle_interruption(&self, interruption: Interruption) {
        match interruption {
            Interruption::Began => debug!("Audio interruption began"),
            Interruption::Ended => {
                debug!("Audio interruption ended, asking observers to resync");
                self.bus.broadcast(PlaybackEvent::ResyncRequested);
            }
        }
    }

    /// Reload and resume the stream when connectivity returns mid-play.
    pub fn on_network_change(&self, previous: NetworkStatus, current: NetworkStatus) -> Result<()> {
        let mut inner = self.lock();
        self.bus
            .broadcast(PlaybackEvent::ConnectivityChanged { previous, current });

        let restored = !previous.is_reachable() && current.is_reachable();
        let loaded = inner.state;
        match loaded {
            Some(state) if restored && !inner.engine.is_paused() => {
                info!(%state, "Connectivity restored, reloading stream");
                self.switch_locked(&mut inner, state)?;
                inner.engine.play()?;
                self.publish_status(&inner);
            }
            _ => {}
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Now playing
    // ------------------------------------------------------------------

    /// Apply a track fetch started under `generation`.
    ///
    /// Returns an artwork lookup to run when the resolved artist differs
    /// from the one the current artwork belongs to.
    pub fn apply_track(
        &self,
        generation: u64,
        result: &FetchResult<Track>,
    ) -> Option<ArtworkRequest> {
        let mut inner = self.lock();
        if generation != inner.generation || inner.state.is_none() {
            debug!(
                generation,
                current = inner.generation,
                "Dropping stale track result"
            );
            return None;
        }

        let display = TrackDisplay::from_result(result);
        let artist = display
            .track()
            .filter(|track| track.has_artist())
            .map(|track| track.artist().to_string());

        let mut next = inner.now_playing.with_track(display);
        let mut request = None;
        if artist != inner.artwork_artist {
            next.artwork = Artwork::Default;
            inner.artwork_artist = artist.clone();
            request = artist.map(|artist| ArtworkRequest { generation, artist });
        }

        self.replace_now_playing(&mut inner, next);
        request
    }

    /// Apply an artwork fetch for `artist` started under `generation`.
    ///
    /// Failures fall back to the default artwork without further notice.
    pub fn apply_artwork(
        &self,
        generation: u64,
        artist: &str,
        result: FetchResult<ArtistArtwork>,
    ) {
        let mut inner = self.lock();
        if generation != inner.generation || inner.artwork_artist.as_deref() != Some(artist) {
            debug!(generation, artist, "Dropping stale artwork result");
            return;
        }

        let artwork = match result {
            Ok(artwork) => Artwork::from(artwork),
            Err(e) => {
                debug!(artist, error = %e, "No artwork, using default");
                Artwork::Default
            }
        };
        let next = inner.now_playing.with_artwork(artwork);
        self.replace_now_playing(&mut inner, next);
    }

    fn replace_now_playing(&self, inner: &mut Inner, next: NowPlayingInfo) {
        if *inner.now_playing == next {
            return;
        }
        inner.now_playing = Arc::new(next);
        self.bus.broadcast(PlaybackEvent::NowPlayingChanged {
            info: inner.now_playing.clone(),
        });
    }
}

/// Channels without an `Edge` mount only take `Best`.
fn normalize(state: PlaybackState) -> PlaybackState {
    if state.channel.supports(state.quality) {
        state
    } else {
        PlaybackState::new(state.channel, Quality::Best)
    }
}
