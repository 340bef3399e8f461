use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("manifest request failed with HTTP {status} for {url}")]
    ManifestFetch { url: String, status: StatusCode },

    #[error("master manifest `{url}` has rendition tags but no playable variant URI")]
    NoPlayableVariant { url: String },

    #[error("nested manifest chain exceeded the limit of {max_depth} hops")]
    NestedManifestTooDeep { max_depth: usize },

    #[error("encrypted streams are not supported (`{url}` carries an EXT-X-KEY directive)")]
    EncryptedStream { url: String },

    #[error("manifest `{url}` lists no media segments")]
    EmptyManifest { url: String },

    #[error("failed to download `{url}`: {reason}")]
    SegmentDownload {
        url: String,
        reason: String,
        retryable: bool,
    },

    #[error("invalid manifest `{url}`: {reason}")]
    InvalidManifest { url: String, reason: String },

    #[error("invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("proxy configuration error: {reason}")]
    ProxyConfiguration { reason: String },

    #[error("HTTP request failed: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("download cancelled")]
    Cancelled,

    #[error("download session has already been started")]
    SessionAlreadyStarted,

    #[error("invalid session name {name:?}: must be a single path component")]
    InvalidSessionName { name: String },
}

impl DownloadError {
    pub fn manifest_fetch(url: impl Into<String>, status: StatusCode) -> Self {
        Self::ManifestFetch {
            url: url.into(),
            status,
        }
    }

    pub fn no_playable_variant(url: impl Into<String>) -> Self {
        Self::NoPlayableVariant { url: url.into() }
    }

    pub fn encrypted_stream(url: impl Into<String>) -> Self {
        Self::EncryptedStream { url: url.into() }
    }

    pub fn empty_manifest(url: impl Into<String>) -> Self {
        Self::EmptyManifest { url: url.into() }
    }

    pub fn segment_download(
        url: impl Into<String>,
        reason: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self::SegmentDownload {
            url: url.into(),
            reason: reason.into(),
            retryable,
        }
    }

    pub fn invalid_manifest(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidManifest {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_header(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn proxy_configuration(reason: impl Into<String>) -> Self {
        Self::ProxyConfiguration {
            reason: reason.into(),
        }
    }

    /// Whether repeating the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ManifestFetch { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::SegmentDownload { retryable, .. } => *retryable,
            Self::Network { .. } | Self::Io { .. } => true,
            Self::NoPlayableVariant { .. }
            | Self::NestedManifestTooDeep { .. }
            | Self::EncryptedStream { .. }
            | Self::EmptyManifest { .. }
            | Self::InvalidManifest { .. }
            | Self::InvalidHeader { .. }
            | Self::ProxyConfiguration { .. }
            | Self::Cancelled
            | Self::SessionAlreadyStarted
            | Self::InvalidSessionName { .. } => false,
        }
    }

    /// The URL of the resource that was in flight when the error occurred, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::ManifestFetch { url, .. }
            | Self::NoPlayableVariant { url }
            | Self::EncryptedStream { url }
            | Self::EmptyManifest { url }
            | Self::SegmentDownload { url, .. }
            | Self::InvalidManifest { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Classify a reqwest error as worth retrying.
pub(crate) fn is_retryable_reqwest_error(e: &reqwest::Error) -> bool {
    e.is_connect() || e.is_timeout() || e.is_request() || e.is_body() || e.is_decode()
}
