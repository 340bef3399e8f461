// Offline HLS: resolve a master manifest, fetch every segment, rewrite the
// playlist to point at local files.

pub mod attributes;
pub mod config;
mod downloader;
pub mod events;
mod hls_downloader;
pub mod manifest;
pub mod retry;
pub mod rewriter;
pub mod segment;
mod session;
pub mod transport;
pub mod url_resolver;
pub mod variant;

// Re-exports for easier access
pub use attributes::AttributeList;
pub use config::{DEFAULT_MAX_NESTING_DEPTH, HlsConfig};
pub use downloader::SegmentDownloader;
pub use events::{ProgressCallback, SessionState};
pub use hls_downloader::HlsDownloader;
pub use manifest::{ManifestLine, TerminalManifest, classify};
pub use retry::RetryPolicy;
pub use rewriter::rewrite;
pub use segment::{InitSegment, Segment, infer_extension};
pub use session::{DownloadOptions, DownloadResult, DownloadSession, download_adaptive_stream};
pub use transport::{HttpTransport, Transport};
pub use url_resolver::resolve_url;
pub use variant::{ResolvedManifest, Variant, VariantResolver};
