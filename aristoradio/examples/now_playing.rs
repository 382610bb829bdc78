//! Example: show what is on air on every Radio Aristocrats channel
//!
//! Run with: cargo run -p aristoradio --example now_playing
//! With artwork: cargo run -p aristoradio --example now_playing -- <lastfm-api-key>

use aristoradio::{AristocratsClient, ArtworkClient, Channel, PlaybackState};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let client = AristocratsClient::new().await?;
    let artwork = match env::args().nth(1) {
        Some(key) => Some(ArtworkClient::builder().api_key(key).build()?),
        None => None,
    };

    for channel in Channel::ALL {
        println!("{} ({})", channel, client.feed_url(channel)?);

        for quality in channel.qualities() {
            let url = client.stream_url(PlaybackState::new(channel, *quality))?;
            println!("  Stream {:?}: {}", quality, url);
        }

        match client.fetch_now_playing(channel).await {
            Ok(feed) => {
                println!("  Track: {}", feed.track);
                if let Some(message) = &feed.announcement {
                    println!("  Announcement: {}", message);
                }
                if !feed.is_on_air(client.on_air_marker()) {
                    println!("  (no song on air)");
                    continue;
                }

                if let (Some(artwork), true) = (&artwork, feed.track.has_artist()) {
                    match artwork.fetch_artwork(feed.track.artist()).await {
                        Ok(art) => println!(
                            "  Artwork: {} ({}x{})",
                            art.url,
                            art.image.width(),
                            art.image.height()
                        ),
                        Err(e) => println!("  Artwork unavailable: {}", e),
                    }
                }
            }
            Err(e) => println!("  Error ({:?}): {}", e.kind(), e),
        }
        println!();
    }

    Ok(())
}
