//! Polling tests against a mock feed server

use aristoplayer::{
    Artwork, ChannelPage, NowPlayingRefresher, PlaybackCoordinator, PlaybackEvent, TrackDisplay,
    VirtualEngine,
};
use aristoradio::{AristocratsClient, ArtworkClient, Channel, ErrorKind};
use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::json;
use std::io::Cursor;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STREAM_FEED: &str = r#"<Schedule><Event><Song title="So What"><Artist name="Miles Davis"/></Song><Announcement Display="Now On Air: Miles Davis"/></Event></Schedule>"#;

async fn feeds(server: &MockServer) -> AristocratsClient {
    AristocratsClient::builder()
        .feed_base(format!("{}/service", server.uri()))
        .timeout(Duration::from_secs(2))
        .build()
        .await
        .unwrap()
}

fn png_bytes() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::new(8, 8));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

async fn mount_stream_feed(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/service/NowOnAir.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(STREAM_FEED))
        .mount(server)
        .await;
}

#[tokio::test]
async fn refresh_once_resolves_track_then_artwork() {
    let server = MockServer::start().await;
    mount_stream_feed(&server).await;

    Mock::given(method("GET"))
        .and(path("/2.0/"))
        .and(query_param("artist", "Miles Davis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "artist": {"image": [
                {"#text": format!("{}/img/xl.png", server.uri()), "size": "extralarge"}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/xl.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes()))
        .expect(1)
        .mount(&server)
        .await;

    let feeds = feeds(&server).await;
    let artwork = ArtworkClient::builder()
        .api_base(format!("{}/2.0/", server.uri()))
        .api_key("key")
        .build()
        .unwrap();
    let coordinator =
        PlaybackCoordinator::new(Box::new(VirtualEngine::new()), feeds.clone(), Channel::Stream, None)
            .unwrap();
    let rx = coordinator.subscribe();
    let refresher =
        NowPlayingRefresher::new(feeds, Some(artwork), coordinator.clone(), Duration::from_secs(3));

    let result = refresher.refresh_once().await.unwrap();
    assert_eq!(result.unwrap().artist(), "Miles Davis");

    let info = coordinator.now_playing();
    assert_eq!(
        info.track.track().map(|t| t.title().to_string()),
        Some("So What".to_string())
    );
    assert_eq!(info.artwork.artist(), Some("Miles Davis"));

    // Track first, artwork second
    let updates: Vec<_> = rx
        .try_iter()
        .filter_map(|event| match event {
            PlaybackEvent::NowPlayingChanged { info } => Some(info),
            _ => None,
        })
        .collect();
    assert_eq!(updates.len(), 2);
    assert!(matches!(updates[0].track, TrackDisplay::Resolved(_)));
    assert_eq!(updates[0].artwork, Artwork::Default);
    assert!(matches!(updates[1].artwork, Artwork::Artist { .. }));

    // Same artist on the next cycle: no second artwork lookup (expect(1))
    refresher.refresh_once().await.unwrap().unwrap();
}

#[tokio::test]
async fn refresh_once_without_artwork_client() {
    let server = MockServer::start().await;
    mount_stream_feed(&server).await;

    let feeds = feeds(&server).await;
    let coordinator =
        PlaybackCoordinator::new(Box::new(VirtualEngine::new()), feeds.clone(), Channel::Stream, None)
            .unwrap();
    let refresher = NowPlayingRefresher::new(feeds, None, coordinator.clone(), Duration::from_secs(3));

    refresher.refresh_once().await.unwrap().unwrap();
    assert_eq!(coordinator.now_playing().artwork, Artwork::Default);

    coordinator.stop();
    assert!(refresher.refresh_once().await.is_none());
}

#[tokio::test]
async fn page_refresh_raises_alert_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/service/nowplaying-amusic.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let feeds = feeds(&server).await;
    let coordinator =
        PlaybackCoordinator::new(Box::new(VirtualEngine::new()), feeds.clone(), Channel::Stream, None)
            .unwrap();
    let refresher = NowPlayingRefresher::new(feeds, None, coordinator, Duration::from_secs(3));

    let mut page = ChannelPage::new(Channel::AMusic);
    let alert = refresher.refresh_page(&mut page).await.unwrap();
    assert_eq!(alert.kind, ErrorKind::NetworkRequest);
    assert_eq!(
        page.display(),
        &TrackDisplay::Unavailable(ErrorKind::NetworkRequest)
    );
}

#[tokio::test]
async fn polling_task_stops_on_cancel() {
    let server = MockServer::start().await;
    mount_stream_feed(&server).await;

    let feeds = feeds(&server).await;
    let coordinator =
        PlaybackCoordinator::new(Box::new(VirtualEngine::new()), feeds.clone(), Channel::Stream, None)
            .unwrap();
    let refresher =
        NowPlayingRefresher::new(feeds, None, coordinator.clone(), Duration::from_millis(50));

    let cancel = CancellationToken::new();
    let handle = refresher.spawn(cancel.clone());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(matches!(
        coordinator.now_playing().track,
        TrackDisplay::Resolved(_)
    ));

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("polling task did not stop")
        .unwrap();
}
