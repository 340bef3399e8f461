// Download session: resolve -> classify -> download -> rewrite, for one call.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::DownloadError;
use crate::hls::config::HlsConfig;
use crate::hls::downloader::SegmentDownloader;
use crate::hls::events::{ProgressCallback, SessionState};
use crate::hls::manifest::{TerminalManifest, classify};
use crate::hls::rewriter::rewrite;
use crate::hls::transport::Transport;
use crate::hls::variant::VariantResolver;

/// Inputs of one download.
#[derive(Clone)]
pub struct DownloadOptions {
    pub manifest_url: String,
    /// Forwarded to every manifest and segment request
    pub headers: HeaderMap,
    /// Parent directory of the session folder
    pub root_dir: PathBuf,
    /// Caller-chosen folder name
    pub session_name: String,
    pub on_progress: Option<ProgressCallback>,
    pub cancellation: CancellationToken,
}

impl DownloadOptions {
    pub fn new(
        manifest_url: impl Into<String>,
        root_dir: impl Into<PathBuf>,
        session_name: impl Into<String>,
    ) -> Self {
        Self {
            manifest_url: manifest_url.into(),
            headers: HeaderMap::new(),
            root_dir: root_dir.into(),
            session_name: session_name.into(),
            on_progress: None,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, DownloadError> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| DownloadError::invalid_header(name, e.to_string()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| DownloadError::invalid_header(name, e.to_string()))?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn with_progress<F>(mut self, on_progress: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(on_progress));
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// `<root_dir>/<session_name>`
    pub fn session_directory(&self) -> PathBuf {
        self.root_dir.join(&self.session_name)
    }
}

impl std::fmt::Debug for DownloadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadOptions")
            .field("manifest_url", &self.manifest_url)
            .field("headers", &self.headers.len())
            .field("root_dir", &self.root_dir)
            .field("session_name", &self.session_name)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

/// A playable local copy of a stream. The playlist needs no network access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadResult {
    /// `<root_dir>/<session_name>/index`
    pub playlist_path: PathBuf,
    /// `<root_dir>/<session_name>`
    pub directory: PathBuf,
    pub total_bytes: u64,
    pub segment_count: usize,
}

/// State of one in-flight download. Never shared between calls.
pub struct DownloadSession {
    transport: Arc<dyn Transport>,
    config: Arc<HlsConfig>,
    options: DownloadOptions,
    state: SessionState,
    session_directory: PathBuf,
    total_bytes: u64,
    completed_segments: usize,
    /// Files this session writes, known once the manifest is classified
    planned_files: Vec<PathBuf>,
    directory_created: bool,
}

impl DownloadSession {
    pub fn new(
        transport: Arc<dyn Transport>,
        config: Arc<HlsConfig>,
        options: DownloadOptions,
    ) -> Self {
        let session_directory = options.session_directory();
        Self {
            transport,
            config,
            options,
            state: SessionState::Created,
            session_directory,
            total_bytes: 0,
            completed_segments: 0,
            planned_files: Vec::new(),
            directory_created: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session_directory(&self) -> &Path {
        &self.session_directory
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = %self.state, to = %next, "Session state change");
        self.state = next;
    }

    /// Run the session to completion or failure. A session runs once.
    #[instrument(skip(self), fields(url = %self.options.manifest_url, session = %self.options.session_name))]
    pub async fn run(&mut self) -> Result<DownloadResult, DownloadError> {
        if self.state != SessionState::Created {
            return Err(DownloadError::SessionAlreadyStarted);
        }

        if let Err(e) = validate_session_name(&self.options.session_name) {
            self.transition(SessionState::Failed(e.to_string()));
            return Err(e);
        }

        let result = self.execute().await;
        match &result {
            Ok(download) => {
                self.transition(SessionState::Completed);
                info!(
                    playlist = %download.playlist_path.display(),
                    segments = download.segment_count,
                    bytes = download.total_bytes,
                    "Download completed"
                );
            }
            Err(e) => {
                self.transition(SessionState::Failed(e.to_string()));
                self.cleanup().await;
            }
        }
        result
    }

    async fn execute(&mut self) -> Result<DownloadResult, DownloadError> {
        let token = self.options.cancellation.clone();
        if token.is_cancelled() {
            return Err(DownloadError::Cancelled);
        }

        self.transition(SessionState::ResolvingVariant);
        let resolved = {
            let resolver = VariantResolver::new(
                self.transport.as_ref(),
                &self.options.headers,
                self.config.max_nesting_depth,
            );
            tokio::select! {
                biased;
                _ = token.cancelled() => return Err(DownloadError::Cancelled),
                resolved = resolver.resolve_terminal(&self.options.manifest_url) => resolved?,
            }
        };

        let manifest = classify(
            &resolved.manifest_url,
            &resolved.manifest_text,
            &self.config.default_segment_extension,
            &self.config.default_init_extension,
        )?;
        let total = manifest.segment_count();

        self.prepare_directory(&manifest).await?;
        self.transition(SessionState::Downloading {
            completed: 0,
            total,
        });

        let downloader = SegmentDownloader::new(
            self.transport.as_ref(),
            &self.options.headers,
            &self.session_directory,
            &self.config.segment_retry,
            &token,
        )
        .with_concurrency(self.config.download_concurrency);

        self.total_bytes += downloader
            .download_init_segments(&manifest.init_segments)
            .await?;

        let on_progress = self.options.on_progress.clone();
        let state = &mut self.state;
        let completed_segments = &mut self.completed_segments;
        let segment_bytes = downloader
            .download_segments(&manifest.segments, |completed, _bytes| {
                *completed_segments = completed;
                *state = SessionState::Downloading { completed, total };
                if let Some(callback) = &on_progress {
                    callback(completed, total);
                }
            })
            .await?;
        self.total_bytes += segment_bytes;

        self.transition(SessionState::Rewriting);
        let playlist_path = self.session_directory.join(&self.config.playlist_file_name);
        tokio::fs::write(&playlist_path, rewrite(&manifest)).await?;

        Ok(DownloadResult {
            playlist_path,
            directory: self.session_directory.clone(),
            total_bytes: self.total_bytes,
            segment_count: self.completed_segments,
        })
    }

    async fn prepare_directory(&mut self, manifest: &TerminalManifest) -> Result<(), DownloadError> {
        let dir = &self.session_directory;
        self.planned_files = manifest
            .init_segments
            .iter()
            .map(|init| dir.join(&init.file_name))
            .chain(manifest.segments.iter().map(|s| dir.join(s.file_name())))
            .chain(std::iter::once(dir.join(&self.config.playlist_file_name)))
            .collect();

        tokio::fs::create_dir_all(&self.options.root_dir).await?;
        match tokio::fs::create_dir(dir).await {
            Ok(()) => self.directory_created = true,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }
        debug!(directory = %dir.display(), created = self.directory_created, "Session directory ready");
        Ok(())
    }

    /// Remove what this session wrote: the whole directory when the session
    /// created it, otherwise only its own files.
    async fn cleanup(&mut self) {
        if !self.config.cleanup_on_failure {
            return;
        }

        if self.directory_created {
            match tokio::fs::remove_dir_all(&self.session_directory).await {
                Ok(()) => debug!(directory = %self.session_directory.display(), "Removed session directory"),
                Err(e) => warn!(
                    directory = %self.session_directory.display(),
                    error = %e,
                    "Failed to remove session directory"
                ),
            }
            return;
        }

        for file in &self.planned_files {
            match tokio::fs::remove_file(file).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(file = %file.display(), error = %e, "Failed to remove partial file"),
            }
        }
    }
}

/// A session name must be exactly one normal path component, so the session
/// directory is always a direct child of `root_dir`.
fn validate_session_name(name: &str) -> Result<(), DownloadError> {
    let mut components = Path::new(name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_normal || name.contains(['/', '\\']) {
        return Err(DownloadError::InvalidSessionName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Download the stream at `options.manifest_url` into
/// `<root_dir>/<session_name>` and return the local playlist.
pub async fn download_adaptive_stream(
    transport: Arc<dyn Transport>,
    config: Arc<HlsConfig>,
    options: DownloadOptions,
) -> Result<DownloadResult, DownloadError> {
    DownloadSession::new(transport, config, options).run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        assert!(validate_session_name("episode-1").is_ok());
        assert!(validate_session_name("show.s01e02").is_ok());
    }

    #[test]
    fn rejects_names_that_leave_the_root() {
        for name in ["", ".", "..", "a/b", "a\\b", "/abs", "../up", "./"] {
            assert!(
                matches!(
                    validate_session_name(name),
                    Err(DownloadError::InvalidSessionName { .. })
                ),
                "{name:?} should be rejected"
            );
        }
    }
}
