// Terminal manifest classification: every line becomes a directive, an init
// segment reference, a segment URI, or a blank.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::DownloadError;
use crate::hls::attributes::AttributeList;
use crate::hls::segment::{InitSegment, Segment};
use crate::hls::url_resolver::resolve_url;

pub(crate) const KEY_TAG: &str = "#EXT-X-KEY:";
pub(crate) const MAP_TAG: &str = "#EXT-X-MAP:";

/// One classified line of a terminal manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLine {
    Blank,
    /// Any tag or comment other than `EXT-X-MAP`, kept verbatim
    Directive(String),
    /// `EXT-X-MAP` directive; `init` indexes [`TerminalManifest::init_segments`]
    Map {
        attributes: AttributeList,
        init: usize,
    },
    /// Segment URI line; `segment` indexes [`TerminalManifest::segments`]
    Segment { segment: usize },
}

/// A terminal manifest split into lines plus the resources it references.
#[derive(Debug, Clone)]
pub struct TerminalManifest {
    pub url: String,
    pub lines: Vec<ManifestLine>,
    /// Segments in manifest (playback) order
    pub segments: Vec<Segment>,
    /// Distinct init segments in order of first reference
    pub init_segments: Vec<InitSegment>,
}

impl TerminalManifest {
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

/// Whether any line is an encryption-key directive.
pub fn is_encrypted(text: &str) -> bool {
    text.lines()
        .any(|line| line.trim_start().starts_with(KEY_TAG))
}

/// Classify the lines of the terminal manifest fetched from `url`.
///
/// Fails with [`DownloadError::EncryptedStream`] before looking at any segment when
/// an `EXT-X-KEY` directive is present, and with [`DownloadError::EmptyManifest`]
/// when no segment URI is found.
pub fn classify(
    url: &str,
    text: &str,
    default_segment_extension: &str,
    default_init_extension: &str,
) -> Result<TerminalManifest, DownloadError> {
    if is_encrypted(text) {
        return Err(DownloadError::encrypted_stream(url));
    }

    let mut lines = Vec::new();
    let mut segments = Vec::new();
    let mut init_segments: Vec<InitSegment> = Vec::new();
    let mut init_by_url: HashMap<String, usize> = HashMap::new();

    for raw in text.lines() {
        let line = raw.trim();

        if line.is_empty() {
            lines.push(ManifestLine::Blank);
        } else if let Some(rest) = line.strip_prefix(MAP_TAG) {
            let attributes = AttributeList::parse(rest);
            let Some(map_uri) = attributes.unquoted("URI") else {
                warn!(url, line, "EXT-X-MAP without URI, keeping it verbatim");
                lines.push(ManifestLine::Directive(raw.to_string()));
                continue;
            };

            let init_url = resolve_url(url, map_uri);
            let init = match init_by_url.get(&init_url).copied() {
                Some(existing) => existing,
                None => {
                    let init_segment = InitSegment::new(init_url.clone(), default_init_extension);
                    debug!(url = %init_url, file = %init_segment.file_name, "Init segment");
                    init_segments.push(init_segment);
                    init_by_url.insert(init_url, init_segments.len() - 1);
                    init_segments.len() - 1
                }
            };
            lines.push(ManifestLine::Map { attributes, init });
        } else if line.starts_with('#') {
            lines.push(ManifestLine::Directive(raw.to_string()));
        } else {
            let index = segments.len();
            segments.push(Segment::new(
                index,
                resolve_url(url, line),
                default_segment_extension,
            ));
            lines.push(ManifestLine::Segment { segment: index });
        }
    }

    if segments.is_empty() {
        return Err(DownloadError::empty_manifest(url));
    }

    debug!(
        url,
        segments = segments.len(),
        init_segments = init_segments.len(),
        lines = lines.len(),
        "Classified terminal manifest"
    );

    Ok(TerminalManifest {
        url: url.to_string(),
        lines,
        segments,
        init_segments,
    })
}
