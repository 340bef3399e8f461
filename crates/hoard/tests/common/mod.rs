//! Shared fixtures for the engine integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use hoard_engine::{DownloadError, Transport};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

/// Send engine tracing output through the test harness writer.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone)]
enum Route {
    Text(String),
    Binary(Bytes),
    Status(StatusCode),
    /// Fails with a retryable error `remaining` more times, then serves `body`
    Flaky { remaining: usize, body: Bytes },
}

/// One request seen by [`FakeTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: HeaderMap,
}

/// In-memory [`Transport`]: URLs map to canned responses, unknown URLs are 404.
#[derive(Debug, Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<RecordedRequest>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every binary download for `delay` before writing it.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn text(self, url: &str, body: &str) -> Self {
        self.route(url, Route::Text(body.to_string()))
    }

    pub fn binary(self, url: &str, body: &'static [u8]) -> Self {
        self.route(url, Route::Binary(Bytes::from_static(body)))
    }

    pub fn status(self, url: &str, status: StatusCode) -> Self {
        self.route(url, Route::Status(status))
    }

    pub fn flaky(self, url: &str, failures: usize, body: &'static [u8]) -> Self {
        self.route(
            url,
            Route::Flaky {
                remaining: failures,
                body: Bytes::from_static(body),
            },
        )
    }

    fn route(self, url: &str, route: Route) -> Self {
        self.routes.lock().unwrap().insert(url.to_string(), route);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, url: &str, headers: &HeaderMap) -> Option<Route> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            headers: headers.clone(),
        });

        let mut routes = self.routes.lock().unwrap();
        let route = routes.get_mut(url)?;
        if let Route::Flaky { remaining, body } = route {
            if *remaining == 0 {
                return Some(Route::Binary(body.clone()));
            }
            *remaining -= 1;
            return Some(Route::Status(StatusCode::SERVICE_UNAVAILABLE));
        }
        Some(route.clone())
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn fetch_text(&self, url: &str, headers: &HeaderMap) -> Result<String, DownloadError> {
        match self.record(url, headers) {
            Some(Route::Text(body)) => Ok(body),
            Some(Route::Binary(body)) => Ok(String::from_utf8_lossy(&body).into_owned()),
            Some(Route::Status(status)) => Err(DownloadError::manifest_fetch(url, status)),
            Some(Route::Flaky { .. }) | None => {
                Err(DownloadError::manifest_fetch(url, StatusCode::NOT_FOUND))
            }
        }
    }

    async fn download_binary(
        &self,
        url: &str,
        destination: &Path,
        headers: &HeaderMap,
    ) -> Result<u64, DownloadError> {
        let route = self.record(url, headers);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let body = match route {
            Some(Route::Binary(body)) => body,
            Some(Route::Text(body)) => Bytes::from(body),
            Some(Route::Status(status)) => {
                return Err(DownloadError::segment_download(
                    url,
                    format!("HTTP {status}"),
                    status.is_server_error(),
                ));
            }
            Some(Route::Flaky { .. }) | None => {
                return Err(DownloadError::segment_download(url, "HTTP 404 Not Found", false));
            }
        };

        tokio::fs::write(destination, &body).await?;
        Ok(body.len() as u64)
    }
}

pub const MASTER_URL: &str = "https://cdn/x/master";

pub const MASTER: &str = "#EXTM3U\n\
#EXT-X-VERSION:3\n\
#EXT-X-STREAM-INF:BANDWIDTH=1500000,RESOLUTION=1280x720\n\
720/index\n\
#EXT-X-STREAM-INF:BANDWIDTH=3000000,RESOLUTION=1920x1080\n\
1080/index\n";

pub const MEDIA_1080: &str = "#EXTM3U\n\
#EXT-X-VERSION:3\n\
#EXT-X-TARGETDURATION:4\n\
#EXT-X-MEDIA-SEQUENCE:0\n\
#EXTINF:4.000,\n\
seg1.ts\n\
#EXTINF:4.000,\n\
seg2.ts\n\
#EXTINF:3.500,\n\
seg3.ts\n\
#EXT-X-ENDLIST\n";

/// The two-rendition stream whose 1080p rendition holds three segments.
pub fn two_rendition_stream() -> FakeTransport {
    FakeTransport::new()
        .text(MASTER_URL, MASTER)
        .text("https://cdn/x/720/index", "#EXTM3U\n#EXTINF:4.0,\nlow.ts\n")
        .text("https://cdn/x/1080/index", MEDIA_1080)
        .binary("https://cdn/x/1080/seg1.ts", b"segment-one")
        .binary("https://cdn/x/1080/seg2.ts", b"segment-two")
        .binary("https://cdn/x/1080/seg3.ts", b"segment-three")
}

/// Terminal manifest with `count` segments at `https://cdn/media/index`.
pub fn media_with_segments(count: usize) -> FakeTransport {
    let mut manifest = String::from("#EXTM3U\n#EXT-X-TARGETDURATION:2\n");
    for i in 0..count {
        manifest.push_str(&format!("#EXTINF:2.0,\npart{i}.ts\n"));
    }
    manifest.push_str("#EXT-X-ENDLIST\n");

    let mut transport = FakeTransport::new().text("https://cdn/media/index", &manifest);
    for i in 0..count {
        transport = transport.binary(&format!("https://cdn/media/part{i}.ts"), b"payload");
    }
    transport
}

/// `masters` master manifests chained one rendition deep, ending in a terminal
/// manifest. The entry point is `https://cdn/nest/0`.
pub fn nested_stream(masters: usize) -> FakeTransport {
    let mut transport = FakeTransport::new();
    for level in 0..masters {
        let master = format!(
            "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1000\n{}\n",
            level + 1
        );
        transport = transport.text(&format!("https://cdn/nest/{level}"), &master);
    }
    transport
        .text(
            &format!("https://cdn/nest/{masters}"),
            "#EXTM3U\n#EXTINF:1.0,\nleaf.ts\n",
        )
        .binary("https://cdn/nest/leaf.ts", b"leaf")
}

/// Sorted file names in `dir`.
pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
