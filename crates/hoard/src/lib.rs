//! # hoard-engine
//!
//! Turns a remote HLS stream into a self-contained local asset: the master
//! manifest is resolved down to its highest-bandwidth rendition, every segment
//! (and init segment) is downloaded into one directory, and the playlist is
//! rewritten to reference the local files only.
//!
//! ```no_run
//! use hoard_engine::{DownloadOptions, HlsConfig, HlsDownloader};
//!
//! # async fn run() -> Result<(), hoard_engine::DownloadError> {
//! let downloader = HlsDownloader::new(HlsConfig::default())?;
//! let options = DownloadOptions::new("https://cdn.example.com/show/master.m3u8", "/tmp/downloads", "episode-1")
//!     .with_progress(|done, total| println!("{done}/{total}"));
//! let result = downloader.download(options).await?;
//! println!("playlist at {}", result.playlist_path.display());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod hls;
pub mod proxy;

pub use builder::DownloaderConfigBuilder;
pub use client::create_client;
pub use config::{DEFAULT_USER_AGENT, DownloaderConfig};
pub use error::DownloadError;
pub use hls::{
    DownloadOptions, DownloadResult, DownloadSession, HlsConfig, HlsDownloader, HttpTransport,
    RetryPolicy, SessionState, Transport, download_adaptive_stream,
};
pub use proxy::{ProxyAuth, ProxyConfig, ProxyType};
