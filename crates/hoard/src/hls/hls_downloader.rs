use std::sync::Arc;

use crate::DownloadError;
use crate::hls::config::HlsConfig;
use crate::hls::session::{DownloadOptions, DownloadResult, download_adaptive_stream};
use crate::hls::transport::{HttpTransport, Transport};

/// Entry point bundling a transport with engine configuration. Each call to
/// [`HlsDownloader::download`] runs an independent session.
#[derive(Clone)]
pub struct HlsDownloader {
    transport: Arc<dyn Transport>,
    config: Arc<HlsConfig>,
}

impl HlsDownloader {
    /// Downloader over HTTP, with a client built from `config.base`.
    pub fn new(config: HlsConfig) -> Result<Self, DownloadError> {
        let transport = HttpTransport::from_config(&config.base)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, config: HlsConfig) -> Self {
        Self {
            transport,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &HlsConfig {
        &self.config
    }

    pub async fn download(&self, options: DownloadOptions) -> Result<DownloadResult, DownloadError> {
        download_adaptive_stream(Arc::clone(&self.transport), Arc::clone(&self.config), options)
            .await
    }
}
