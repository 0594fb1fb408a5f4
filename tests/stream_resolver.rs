//! Player page resolution against a mock HTTP server

use std::time::Duration;

use iptv_scraper::config::defaults::DEFAULT_STREAM_PATTERN;
use iptv_scraper::errors::ResolveError;
use iptv_scraper::models::ChannelDescriptor;
use iptv_scraper::sources::{StreamResolver, StreamTokenResolver};
use iptv_scraper::utils::build_client;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver(server: &MockServer, timeout: Duration) -> StreamTokenResolver {
    let client = build_client("test-agent/1.0", &format!("{}/", server.uri()), timeout).unwrap();
    StreamTokenResolver::new(
        client,
        format!("{}/player.php?stream={{stream}}", server.uri()),
        DEFAULT_STREAM_PATTERN,
    )
    .unwrap()
}

#[tokio::test]
async fn test_resolves_first_manifest_with_referer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/player.php"))
        .and(query_param("stream", "news"))
        .and(header("referer", format!("{}/", server.uri()).as_str()))
        .and(header("user-agent", "test-agent/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<source src="https://a.test/news/index.m3u8?tok=1"><source src="https://b.test/news/index.m3u8?tok=2">"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let url = resolver(&server, Duration::from_secs(2))
        .resolve(&ChannelDescriptor::new("news"))
        .await
        .unwrap();
    assert_eq!(url, "https://a.test/news/index.m3u8?tok=1");
}

#[tokio::test]
async fn test_pre_encoded_stream_path_is_not_encoded_twice() {
    let server = MockServer::start().await;
    // One decoding of the request query must give back the raw path
    Mock::given(method("GET"))
        .and(path("/player.php"))
        .and(query_param("stream", "a b"))
        .respond_with(ResponseTemplate::new(200).set_body_string("https://a.test/ab/index.m3u8"))
        .expect(1)
        .mount(&server)
        .await;

    let url = resolver(&server, Duration::from_secs(2))
        .resolve(&ChannelDescriptor::new("a%20b"))
        .await
        .unwrap();
    assert_eq!(url, "https://a.test/ab/index.m3u8");
}

#[tokio::test]
async fn test_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/player.php"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = resolver(&server, Duration::from_secs(2))
        .resolve(&ChannelDescriptor::new("news"))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::HttpStatus { status: 403, .. }));
}

#[tokio::test]
async fn test_page_without_manifest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/player.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Channel offline</p>"))
        .mount(&server)
        .await;

    let err = resolver(&server, Duration::from_secs(2))
        .resolve(&ChannelDescriptor::new("news"))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::NoManifest { .. }));
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/player.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("https://a.test/x.m3u8")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = resolver(&server, Duration::from_millis(200))
        .resolve(&ChannelDescriptor::new("news"))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::Timeout { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then release an ephemeral port so nothing is listening on it
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let base = format!("http://127.0.0.1:{port}");
    let client = build_client("test-agent/1.0", &format!("{base}/"), Duration::from_secs(2)).unwrap();
    let resolver = StreamTokenResolver::new(
        client,
        format!("{base}/player.php?stream={{stream}}"),
        DEFAULT_STREAM_PATTERN,
    )
    .unwrap();

    let err = resolver
        .resolve(&ChannelDescriptor::new("news"))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::Transport { .. }), "got {err:?}");
}
