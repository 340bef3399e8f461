// HLS transport: the network capability injected into a download session.

use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest::header::HeaderMap;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, trace};

use crate::error::is_retryable_reqwest_error;
use crate::{DownloadError, DownloaderConfig, create_client};

/// Network operations the engine needs. Implementations must not retry
/// internally; retry policy belongs to the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    /// One GET for manifest text, `headers` forwarded verbatim.
    ///
    /// A non-success status fails with [`DownloadError::ManifestFetch`].
    async fn fetch_text(&self, url: &str, headers: &HeaderMap) -> Result<String, DownloadError>;

    /// Fetch `url` and write the whole body to `destination`, returning the number
    /// of bytes written. Any failure is a [`DownloadError::SegmentDownload`].
    async fn download_binary(
        &self,
        url: &str,
        destination: &Path,
        headers: &HeaderMap,
    ) -> Result<u64, DownloadError>;
}

/// [`Transport`] backed by a shared reqwest [`Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &DownloaderConfig) -> Result<Self, DownloadError> {
        Ok(Self::new(create_client(config)?))
    }

    async fn write_body(
        response: reqwest::Response,
        destination: &Path,
    ) -> Result<u64, DownloadError> {
        let file = File::create(destination).await?;
        let mut writer = BufWriter::new(file);
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;

        Ok(written)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_text(&self, url: &str, headers: &HeaderMap) -> Result<String, DownloadError> {
        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::manifest_fetch(url, status));
        }

        let body = response.bytes().await?;
        let text = String::from_utf8(body.to_vec())
            .map_err(|e| DownloadError::invalid_manifest(url, format!("not valid UTF-8: {e}")))?;
        debug!(url, bytes = text.len(), "Fetched manifest");
        Ok(text)
    }

    async fn download_binary(
        &self,
        url: &str,
        destination: &Path,
        headers: &HeaderMap,
    ) -> Result<u64, DownloadError> {
        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .send()
            .await
            .map_err(|e| {
                DownloadError::segment_download(url, e.to_string(), is_retryable_reqwest_error(&e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let retryable =
                status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS;
            return Err(DownloadError::segment_download(
                url,
                format!("HTTP {status}"),
                retryable,
            ));
        }
        trace!(url, http_version = ?response.version(), "Segment response received");

        Self::write_body(response, destination)
            .await
            .map_err(|e| match e {
                DownloadError::Network { source } => DownloadError::segment_download(
                    url,
                    source.to_string(),
                    is_retryable_reqwest_error(&source),
                ),
                other => DownloadError::segment_download(url, other.to_string(), false),
            })
    }
}
