use std::net::SocketAddr;

use axum::Router;
use axum::http::{HeaderMap as AxumHeaders, StatusCode};
use axum::routing::get;
use hoard_engine::{
    DownloadError, DownloadOptions, DownloaderConfig, HlsConfig, HlsDownloader, HttpTransport,
    Transport,
};
use reqwest::header::{HeaderMap, HeaderValue};
use tempfile::TempDir;

const MASTER: &str = "#EXTM3U\n\
#EXT-X-STREAM-INF:BANDWIDTH=800000\n\
low/index.m3u8\n\
#EXT-X-STREAM-INF:BANDWIDTH=2400000\n\
high/index.m3u8\n";

const MEDIA: &str = "#EXTM3U\n\
#EXT-X-TARGETDURATION:2\n\
#EXTINF:2.0,\n\
a.ts\n\
#EXTINF:2.0,\n\
b.ts\n\
#EXT-X-ENDLIST\n";

async fn secured(headers: AxumHeaders) -> Result<&'static str, StatusCode> {
    match headers.get("x-token").and_then(|v| v.to_str().ok()) {
        Some("letmein") => Ok("#EXTM3U\n#EXTINF:1.0,\nok.ts\n"),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn start_server() -> SocketAddr {
    let app = Router::new()
        .route("/master.m3u8", get(|| async { MASTER }))
        .route("/low/index.m3u8", get(|| async { "#EXTM3U\n#EXTINF:2.0,\nlow.ts\n" }))
        .route("/high/index.m3u8", get(|| async { MEDIA }))
        .route("/high/a.ts", get(|| async { vec![0x47u8; 188] }))
        .route("/high/b.ts", get(|| async { vec![0x47u8; 376] }))
        .route("/secure/index.m3u8", get(secured))
        .route("/secure/ok.ts", get(|| async { "payload" }))
        .route(
            "/broken.ts",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn local_config() -> DownloaderConfig {
    DownloaderConfig::builder().with_system_proxy(false).build()
}

fn transport() -> HttpTransport {
    HttpTransport::from_config(&local_config()).unwrap()
}

#[tokio::test]
async fn fetches_manifest_text() {
    let addr = start_server().await;

    let text = transport()
        .fetch_text(&format!("http://{addr}/master.m3u8"), &HeaderMap::new())
        .await
        .unwrap();

    assert_eq!(text, MASTER);
}

#[tokio::test]
async fn missing_manifest_is_a_fetch_error_with_status() {
    let addr = start_server().await;

    let err = transport()
        .fetch_text(&format!("http://{addr}/nope.m3u8"), &HeaderMap::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DownloadError::ManifestFetch { status, .. } if status == reqwest::StatusCode::NOT_FOUND
    ));
}

#[tokio::test]
async fn writes_segment_body_to_destination() {
    let addr = start_server().await;
    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("a.ts");

    let written = transport()
        .download_binary(
            &format!("http://{addr}/high/a.ts"),
            &destination,
            &HeaderMap::new(),
        )
        .await
        .unwrap();

    assert_eq!(written, 188);
    assert_eq!(std::fs::read(&destination).unwrap(), vec![0x47u8; 188]);
}

#[tokio::test]
async fn segment_http_errors_name_the_url() {
    let addr = start_server().await;
    let dir = TempDir::new().unwrap();
    let url = format!("http://{addr}/broken.ts");

    let err = transport()
        .download_binary(&url, &dir.path().join("broken.ts"), &HeaderMap::new())
        .await
        .unwrap_err();

    match err {
        DownloadError::SegmentDownload {
            url: failed,
            retryable,
            ..
        } => {
            assert_eq!(failed, url);
            assert!(retryable);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn forwards_request_headers() {
    let addr = start_server().await;
    let url = format!("http://{addr}/secure/index.m3u8");
    let http = transport();

    let denied = http.fetch_text(&url, &HeaderMap::new()).await.unwrap_err();
    assert!(matches!(denied, DownloadError::ManifestFetch { .. }));

    let mut headers = HeaderMap::new();
    headers.insert("x-token", HeaderValue::from_static("letmein"));
    assert!(http.fetch_text(&url, &headers).await.is_ok());
}

#[tokio::test]
async fn end_to_end_over_http() {
    let addr = start_server().await;
    let root = TempDir::new().unwrap();

    let config = HlsConfig {
        base: local_config(),
        ..HlsConfig::default()
    };
    let downloader = HlsDownloader::new(config).unwrap();
    let result = downloader
        .download(DownloadOptions::new(
            format!("http://{addr}/master.m3u8"),
            root.path(),
            "local",
        ))
        .await
        .unwrap();

    assert_eq!(result.segment_count, 2);
    assert_eq!(result.total_bytes, 188 + 376);

    let playlist = std::fs::read_to_string(&result.playlist_path).unwrap();
    assert_eq!(
        playlist,
        "#EXTM3U\n\
#EXT-X-TARGETDURATION:2\n\
#EXTINF:2.0,\n\
seg-00000.ts\n\
#EXTINF:2.0,\n\
seg-00001.ts\n\
#EXT-X-ENDLIST\n"
    );
}
