//! Integration tests for aristoradio

use aristoradio::{AristocratsClient, ArtworkClient, Channel, Error, ErrorKind, Track};
use image::{DynamicImage, ImageFormat, RgbImage};
use serde_json::json;
use std::io::Cursor;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PLAYLIST_FEED: &str = r#"<Playlist><song title="T"/><artist title="A"/></Playlist>"#;

const AD_BREAK_FEED: &str = r#"<Playlist><song title="T"/><artist title="A"/></Playlist>
<Schedule><Event><Announcement Display="Ad break"/></Event></Schedule>"#;

const STREAM_FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Schedule>
  <Event>
    <Song title="So What">
      <Artist name="Miles Davis"/>
    </Song>
    <Announcement Display="Now On Air: Miles Davis - So What"/>
  </Event>
</Schedule>"#;

async fn feed_client(server: &MockServer) -> AristocratsClient {
    AristocratsClient::builder()
        .feed_base(format!("{}/service", server.uri()))
        .timeout(Duration::from_secs(2))
        .build()
        .await
        .unwrap()
}

async fn mount_feed(server: &MockServer, file: &str, status: u16, body: impl Into<Vec<u8>>) {
    Mock::given(method("GET"))
        .and(path(format!("/service/{file}")))
        .respond_with(ResponseTemplate::new(status).set_body_bytes(body.into()))
        .mount(server)
        .await;
}

fn png_bytes() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 3, image::Rgb([200, 10, 10])));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

// ============================================================================
// Now-playing feeds
// ============================================================================

#[tokio::test]
async fn test_playlist_feed_success() {
    let server = MockServer::start().await;
    mount_feed(&server, "nowplaying-amusic.xml", 200, PLAYLIST_FEED).await;

    let client = feed_client(&server).await;
    let track = client.fetch_track(Channel::AMusic).await.unwrap();

    assert_eq!(track, Track::new(Some("T"), Some("A")));
}

#[tokio::test]
async fn test_ad_break_is_no_track_info() {
    let server = MockServer::start().await;
    mount_feed(&server, "nowplaying-ajazz.xml", 200, AD_BREAK_FEED).await;

    let client = feed_client(&server).await;
    let err = client.fetch_track(Channel::Jazz).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FailedToObtainTrackInfo);
    assert_eq!(err.announcement(), Some("Ad break"));
    assert!(!err.is_alert_worthy());

    // The raw feed still carries the parsed track
    let feed = client.fetch_now_playing(Channel::Jazz).await.unwrap();
    assert_eq!(feed.track.title(), "T");
}

#[tokio::test]
async fn test_each_channel_reads_its_own_feed() {
    let server = MockServer::start().await;
    mount_feed(&server, "NowOnAir.xml", 200, STREAM_FEED).await;
    mount_feed(&server, "nowplaying-amusic.xml", 200, PLAYLIST_FEED).await;
    mount_feed(
        &server,
        "nowplaying-ajazz.xml",
        200,
        r#"<Playlist><song title="Take Five"/><artist title="Dave Brubeck"/></Playlist>"#,
    )
    .await;

    let client = feed_client(&server).await;

    let stream = client.fetch_track(Channel::Stream).await.unwrap();
    assert_eq!(stream.artist(), "Miles Davis");
    assert_eq!(stream.title(), "So What");

    let amusic = client.fetch_track(Channel::AMusic).await.unwrap();
    assert_eq!(amusic.title(), "T");

    let jazz = client.fetch_track(Channel::Jazz).await.unwrap();
    assert_eq!(jazz.artist(), "Dave Brubeck");
}

#[tokio::test]
async fn test_missing_attribute_is_shape_error() {
    let server = MockServer::start().await;
    mount_feed(
        &server,
        "nowplaying-amusic.xml",
        200,
        r#"<Playlist><song title="T"/></Playlist>"#,
    )
    .await;

    let client = feed_client(&server).await;
    let err = client.fetch_track(Channel::AMusic).await.unwrap_err();

    assert!(matches!(err, Error::MissingAttribute { .. }));
    assert!(err.is_alert_worthy());
}

#[tokio::test]
async fn test_server_error_is_network_request() {
    let server = MockServer::start().await;
    mount_feed(&server, "NowOnAir.xml", 500, "oops").await;

    let client = feed_client(&server).await;
    let err = client.fetch_track(Channel::Stream).await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
    assert_eq!(err.kind(), ErrorKind::NetworkRequest);
}

#[tokio::test]
async fn test_non_utf8_body_is_data_transformation() {
    let server = MockServer::start().await;
    mount_feed(
        &server,
        "nowplaying-amusic.xml",
        200,
        vec![b'<', b'P', 0xff, 0xfe, b'>'],
    )
    .await;

    let client = feed_client(&server).await;
    let err = client.fetch_track(Channel::AMusic).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DataTransformation);
}

#[tokio::test]
async fn test_unreachable_feed() {
    let client = AristocratsClient::builder()
        .feed_base("http://127.0.0.1:9/service")
        .timeout(Duration::from_secs(2))
        .build()
        .await
        .unwrap();

    let err = client.fetch_track(Channel::Stream).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkRequest);
}

// ============================================================================
// Artwork
// ============================================================================

fn artwork_client(server: &MockServer) -> ArtworkClient {
    ArtworkClient::builder()
        .api_base(format!("{}/2.0/", server.uri()))
        .api_key("test-key")
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_artwork_two_hops() {
    let server = MockServer::start().await;
    let image_url = format!("{}/images/xl.png", server.uri());

    Mock::given(method("GET"))
        .and(path("/2.0/"))
        .and(query_param("method", "artist.getInfo"))
        .and(query_param("artist", "Miles Davis"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("autocorrect", "1"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "artist": {
                "name": "Miles Davis",
                "image": [
                    {"#text": format!("{}/images/l.png", server.uri()), "size": "large"},
                    {"#text": image_url, "size": "extralarge"},
                    {"#text": "", "size": "mega"}
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/images/xl.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(png_bytes()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = artwork_client(&server);
    let artwork = client.fetch_artwork("Miles Davis").await.unwrap();

    assert_eq!(artwork.artist, "Miles Davis");
    assert_eq!(artwork.url, image_url);
    assert_eq!(artwork.image.width(), 4);
    assert_eq!(artwork.image.height(), 3);
}

#[tokio::test]
async fn test_artwork_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2.0/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": 6,
            "message": "The artist you supplied could not be found"
        })))
        .mount(&server)
        .await;

    let client = artwork_client(&server);
    let err = client.fetch_artwork_url("Nobody").await.unwrap_err();

    assert!(matches!(err, Error::Api { code: 6, .. }));
    assert_eq!(err.kind(), ErrorKind::NetworkDataInconsistency);
}

#[tokio::test]
async fn test_artwork_gateway_error_with_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2.0/"))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({
            "artist": {"image": []}
        })))
        .mount(&server)
        .await;

    let client = artwork_client(&server);
    let err = client.fetch_artwork_url("Miles Davis").await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 502, .. }));
    assert_eq!(err.kind(), ErrorKind::NetworkRequest);
}

#[tokio::test]
async fn test_artwork_without_extralarge() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2.0/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "artist": {"image": [{"#text": "http://x/s.png", "size": "small"}]}
        })))
        .mount(&server)
        .await;

    let client = artwork_client(&server);
    let err = client.fetch_artwork("A").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::FailedToObtainArtworkUrl);
}

#[tokio::test]
async fn test_artwork_undecodable_image() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/broken.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not an image".to_vec()))
        .mount(&server)
        .await;

    let client = artwork_client(&server);
    let err = client
        .download_image(&format!("{}/images/broken.png", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DataTransformation);
}

#[tokio::test]
async fn test_artwork_download_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = artwork_client(&server);
    let err = client
        .download_image(&format!("{}/images/gone.png", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NetworkRequest);
}
