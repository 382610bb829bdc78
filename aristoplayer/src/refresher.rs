//! Now-playing polling.
//!
//! One cycle fetches the track of the loaded channel, applies it under the
//! generation it was started with, and only then looks up artwork when the
//! artist changed. The polling task repeats the cycle on a fixed interval
//! until its cancellation token fires.

use std::sync::Arc;
use std::time::Duration;

use aristoconfig::Config;
use aristoradio::{AristocratsClient, AristocratsConfigExt, ArtworkClient, FetchResult, Track};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::coordinator::PlaybackCoordinator;
use crate::errors::Result;
use crate::page::{ChannelPage, PageAlert};

#[derive(Clone)]
pub struct NowPlayingRefresher {
    feeds: AristocratsClient,
    artwork: Option<ArtworkClient>,
    coordinator: PlaybackCoordinator,
    interval: Duration,
    wake: Arc<Notify>,
}

impl NowPlayingRefresher {
    pub fn new(
        feeds: AristocratsClient,
        artwork: Option<ArtworkClient>,
        coordinator: PlaybackCoordinator,
        interval: Duration,
    ) -> Self {
        Self {
            feeds,
            artwork,
            coordinator,
            interval,
            wake: Arc::new(Notify::new()),
        }
    }

    /// Interval and artwork settings from the configuration.
    pub fn from_config(
        config: &Config,
        feeds: AristocratsClient,
        coordinator: PlaybackCoordinator,
    ) -> Result<Self> {
        let artwork = ArtworkClient::from_config(config)?;
        let interval = config.get_poll_interval()?;
        Ok(Self::new(feeds, artwork, coordinator, interval))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a cycle now instead of waiting for the next tick.
    pub fn refresh_now(&self) {
        self.wake.notify_one();
    }

    /// One fetch-and-apply cycle for the loaded channel.
    ///
    /// Returns `None` when the coordinator is idle.
    pub async fn refresh_once(&self) -> Option<FetchResult<Track>> {
        let (generation, state) = self.coordinator.snapshot()?;
        let result = self.feeds.fetch_track(state.channel).await;
        if let Err(e) = &result {
            debug!(channel = %state.channel, error = %e, kind = ?e.kind(), "Track fetch failed");
        }

        if let Some(request) = self.coordinator.apply_track(generation, &result) {
            if let Some(artwork) = &self.artwork {
                let fetched = artwork.fetch_artwork(&request.artist).await;
                self.coordinator
                    .apply_artwork(request.generation, &request.artist, fetched);
            }
        }

        Some(result)
    }

    /// Fetch and render the track of a page's own channel.
    pub async fn refresh_page(&self, page: &mut ChannelPage) -> Option<PageAlert> {
        let ticket = page.begin_fetch();
        let result = self.feeds.fetch_track(page.channel()).await;
        page.apply_fetch(ticket, &result)
    }

    /// Poll every interval until `cancel` fires.
    pub fn spawn(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let refresher = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(refresher.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval = ?refresher.interval, "Now-playing polling started");

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                    _ = refresher.wake.notified() => ticker.reset(),
                }

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = refresher.refresh_once() => {}
                }
            }

            info!("Now-playing polling stopped");
        })
    }
}
