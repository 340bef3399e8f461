// Variant resolution: walk master manifests down to a terminal (media) manifest.

use reqwest::header::HeaderMap;
use tracing::{debug, info, warn};

use crate::DownloadError;
use crate::hls::attributes::AttributeList;
use crate::hls::transport::Transport;
use crate::hls::url_resolver::resolve_url;

pub(crate) const STREAM_INF_TAG: &str = "#EXT-X-STREAM-INF:";

/// One rendition advertised by a master manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub bandwidth: u64,
    /// Absolute URL of the rendition's manifest
    pub uri: String,
}

/// A terminal manifest together with the URL it was fetched from.
#[derive(Debug, Clone)]
pub struct ResolvedManifest {
    pub manifest_url: String,
    pub manifest_text: String,
    /// Number of rendition hops followed to reach it
    pub hops: usize,
}

/// Whether `text` advertises renditions (i.e. is a master manifest).
pub fn is_master(text: &str) -> bool {
    text.lines()
        .any(|line| line.trim_start().starts_with(STREAM_INF_TAG))
}

/// Collect `(rendition tag, uri)` pairs from a master manifest, in order.
///
/// The URI of a rendition is the next line that is neither blank nor a tag or
/// comment. A rendition tag followed by another rendition tag has no URI and is
/// skipped.
pub fn parse_variants(master_url: &str, text: &str) -> Vec<Variant> {
    let mut variants = Vec::new();
    let mut pending: Option<u64> = None;

    for line in text.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix(STREAM_INF_TAG) {
            if pending.is_some() {
                warn!(master_url, "Rendition tag without URI, skipping");
            }
            let attributes = AttributeList::parse(rest);
            pending = Some(attributes.decimal("BANDWIDTH").unwrap_or(0));
        } else if line.is_empty() || line.starts_with('#') {
            continue;
        } else if let Some(bandwidth) = pending.take() {
            variants.push(Variant {
                bandwidth,
                uri: resolve_url(master_url, line),
            });
        }
    }

    variants
}

/// Highest bandwidth wins; on a tie the first listed rendition is kept.
pub fn select_variant(variants: &[Variant]) -> Option<&Variant> {
    variants.iter().fold(None, |best: Option<&Variant>, candidate| match best {
        Some(current) if current.bandwidth >= candidate.bandwidth => Some(current),
        _ => Some(candidate),
    })
}

/// Follows the highest-bandwidth rendition until a terminal manifest is reached.
pub struct VariantResolver<'a> {
    transport: &'a dyn Transport,
    headers: &'a HeaderMap,
    max_depth: usize,
}

impl<'a> VariantResolver<'a> {
    pub fn new(transport: &'a dyn Transport, headers: &'a HeaderMap, max_depth: usize) -> Self {
        Self {
            transport,
            headers,
            max_depth,
        }
    }

    pub async fn resolve_terminal(&self, url: &str) -> Result<ResolvedManifest, DownloadError> {
        let mut current_url = url.to_string();
        let mut hops = 0usize;

        loop {
            let text = self.transport.fetch_text(&current_url, self.headers).await?;

            if !is_master(&text) {
                info!(url = %current_url, hops, "Resolved terminal manifest");
                return Ok(ResolvedManifest {
                    manifest_url: current_url,
                    manifest_text: text,
                    hops,
                });
            }

            let variants = parse_variants(&current_url, &text);
            let selected = select_variant(&variants)
                .ok_or_else(|| DownloadError::no_playable_variant(&current_url))?;

            if hops >= self.max_depth {
                return Err(DownloadError::NestedManifestTooDeep {
                    max_depth: self.max_depth,
                });
            }
            hops += 1;

            debug!(
                from = %current_url,
                to = %selected.uri,
                bandwidth = selected.bandwidth,
                candidates = variants.len(),
                "Selected rendition"
            );
            current_url = selected.uri.clone();
        }
    }
}
