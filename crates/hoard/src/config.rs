use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

use crate::proxy::ProxyConfig;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";

/// HTTP client options shared by manifest and segment requests.
///
/// Headers set here go out with every request the client makes; per-download
/// headers (cookies, referer) belong in `DownloadOptions` instead.
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Whole-request limit; zero leaves requests unbounded
    pub timeout: Duration,
    /// TCP + TLS handshake limit
    pub connect_timeout: Duration,
    /// Longest gap allowed between two body chunks
    pub read_timeout: Duration,
    pub follow_redirects: bool,
    pub user_agent: String,
    pub headers: HeaderMap,
    /// Explicit proxy; takes precedence over `use_system_proxy`
    pub proxy: Option<ProxyConfig>,
    /// Honor `HTTP_PROXY` / `HTTPS_PROXY` / `NO_PROXY` when no explicit proxy is set
    pub use_system_proxy: bool,
    pub danger_accept_invalid_certs: bool,
    pub pool_max_idle_per_host: usize,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            // Segment bodies can be large; the read timeout catches stalls.
            timeout: Duration::ZERO,
            connect_timeout: Duration::from_secs(15),
            read_timeout: Duration::from_secs(30),
            follow_redirects: true,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            headers: DownloaderConfig::get_default_headers(),
            proxy: None,
            use_system_proxy: true,
            danger_accept_invalid_certs: false,
            pool_max_idle_per_host: 8,
        }
    }
}

impl DownloaderConfig {
    pub fn builder() -> crate::builder::DownloaderConfigBuilder {
        crate::builder::DownloaderConfigBuilder::new()
    }

    pub fn get_default_headers() -> HeaderMap {
        let mut default_headers = HeaderMap::new();

        default_headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/vnd.apple.mpegurl, application/x-mpegurl, */*"),
        );

        default_headers.insert(
            reqwest::header::ACCEPT_ENCODING,
            HeaderValue::from_static("gzip, deflate"),
        );

        default_headers.insert(
            reqwest::header::CONNECTION,
            HeaderValue::from_static("keep-alive"),
        );

        default_headers
    }
}
