mod logging;

use std::env;
use std::time::Duration;

use aristoconfig::get_config;
use aristoplayer::{
    ChannelPage, Language, LanguagePreference, NetworkStatus, NowPlayingRefresher,
    PlaybackCoordinator, PlaybackEvent, ReachabilityTracker, VirtualEngine,
};
use aristoradio::{AristocratsClient, AristocratsConfigExt, Channel};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_config();
    init_logging(&config);

    // ========== Configuration ==========

    let language_pref = config
        .get_player_language()?
        .parse::<LanguagePreference>()
        .unwrap_or_else(|e| {
            warn!("{}, following the broadcast calendar", e);
            LanguagePreference::Auto
        });
    let language = language_pref.today();

    // Channel to start playing, e.g. `RadioAristocrats jazz`
    let autoplay = match env::args().nth(1) {
        Some(arg) => Some(arg.parse::<Channel>().map_err(anyhow::Error::msg)?),
        None => None,
    };

    if !config.get_aristocrats_enabled()? {
        warn!("Radio Aristocrats source is disabled in the configuration");
        return Ok(());
    }

    // ========== Player assembly ==========

    let feeds = AristocratsClient::from_config(&config).await?;
    let reachability = ReachabilityTracker::new(Some(NetworkStatus::ReachableViaWiFi));

    let coordinator = PlaybackCoordinator::new(
        Box::new(VirtualEngine::new()),
        feeds.clone(),
        config.get_default_channel()?,
        Some(reachability.current()),
    )?;
    let events = coordinator.subscribe();

    let refresher = NowPlayingRefresher::from_config(&config, feeds, coordinator.clone())?;
    let cancel = CancellationToken::new();
    let polling = refresher.spawn(cancel.clone());

    // ========== Visible page ==========

    let mut pages = ChannelPage::all();
    let visible = autoplay
        .or_else(|| coordinator.current_state().map(|s| s.channel))
        .unwrap_or(Channel::Stream)
        .index();

    pages[visible].appear(&coordinator);
    if autoplay.is_some() {
        pages[visible].tap_play(&coordinator)?;
        refresher.refresh_now();
    }
    show_page(&refresher, &mut pages[visible], language).await;

    info!(
        language = language.code(),
        channel = %pages[visible].channel(),
        "RadioAristocrats is ready"
    );
    info!("Press Ctrl+C to stop...");

    // ========== Main loop ==========

    let mut page_ticker = tokio::time::interval(refresher.interval());
    let mut event_ticker = tokio::time::interval(Duration::from_millis(250));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = page_ticker.tick() => {
                // A slow feed must not hold up shutdown
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = show_page(&refresher, &mut pages[visible], language) => {}
                }
            }
            _ = event_ticker.tick() => {
                for event in events.try_iter() {
                    log_event(&event, language);
                }
                pages[visible].process_events(&coordinator);
            }
        }
    }

    info!("Shutting down...");
    cancel.cancel();
    pages[visible].disappear();
    coordinator.stop();
    polling.await?;

    Ok(())
}

async fn show_page(refresher: &NowPlayingRefresher, page: &mut ChannelPage, language: Language) {
    if let Some(alert) = refresher.refresh_page(page).await {
        warn!(
            "{}: {} ({})",
            alert.title(language),
            alert.message(language),
            alert.detail
        );
    }
    let (title, artist) = page.lines(language);
    info!(channel = %page.channel(), playing = page.is_playing(), "{} - {}", artist, title);
}

fn log_event(event: &PlaybackEvent, language: Language) {
    match event {
        PlaybackEvent::StreamChanged { state, generation } => {
            info!(generation, "Stream changed to {}", state)
        }
        PlaybackEvent::PlayStateChanged { status } => info!(?status, "Play state changed"),
        PlaybackEvent::NowPlayingChanged { info } => {
            let (title, artist) = info.lines(language);
            info!(
                artwork = info.artwork.artist().is_some(),
                "Now playing: {} - {}",
                artist,
                title
            );
        }
        PlaybackEvent::ResyncRequested => info!("Observers asked to resync"),
        PlaybackEvent::ConnectivityChanged { previous, current } => {
            info!(?previous, ?current, "Connectivity changed")
        }
    }
}
