use crate::DownloaderConfig;
use crate::hls::retry::RetryPolicy;

/// Default bound on master -> master -> ... hops before giving up.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 6;

/// Engine tunables. `Default` reproduces the baseline behavior: sequential,
/// complete-or-fail downloads and cleanup of the session directory on failure.
#[derive(Debug, Clone)]
pub struct HlsConfig {
    /// HTTP client configuration
    pub base: DownloaderConfig,
    /// Maximum number of rendition hops followed from the entry manifest
    pub max_nesting_depth: usize,
    /// Segments downloaded at once (1 = strictly sequential)
    pub download_concurrency: usize,
    /// Retry behavior for individual segment and init-segment downloads
    pub segment_retry: RetryPolicy,
    /// Extension used when a segment URL has no usable suffix
    pub default_segment_extension: String,
    /// Extension used when an init segment URL has no usable suffix
    pub default_init_extension: String,
    /// File name of the rewritten manifest inside the session directory
    pub playlist_file_name: String,
    /// Remove the session directory when a download fails or is cancelled
    pub cleanup_on_failure: bool,
}

impl Default for HlsConfig {
    fn default() -> Self {
        Self {
            base: DownloaderConfig::default(),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            download_concurrency: 1,
            segment_retry: RetryPolicy::none(),
            default_segment_extension: "ts".to_string(),
            default_init_extension: "mp4".to_string(),
            playlist_file_name: "index".to_string(),
            cleanup_on_failure: true,
        }
    }
}

impl HlsConfig {
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Values below 1 are treated as 1.
    pub fn with_download_concurrency(mut self, concurrency: usize) -> Self {
        self.download_concurrency = concurrency.max(1);
        self
    }

    pub fn with_segment_retry(mut self, policy: RetryPolicy) -> Self {
        self.segment_retry = policy;
        self
    }

    pub fn with_cleanup_on_failure(mut self, cleanup: bool) -> Self {
        self.cleanup_on_failure = cleanup;
        self
    }
}
