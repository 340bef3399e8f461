//! Media segments and init segments of a terminal manifest, and how their local
//! files are named.

use rand::RngExt;

/// Longest suffix (without the dot) accepted as a file extension.
const MAX_EXTENSION_LEN: usize = 5;

/// One media chunk, in playback order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Position among the manifest's segment URIs, starting at 0
    pub index: usize,
    /// Absolute source URL
    pub url: String,
    pub extension: String,
}

impl Segment {
    pub fn new(index: usize, url: String, default_extension: &str) -> Self {
        let extension = infer_extension(&url, default_extension);
        Self {
            index,
            url,
            extension,
        }
    }

    /// `seg-00000.ts`, `seg-00001.ts`, ...
    ///
    /// Zero padding keeps lexical order equal to playback order.
    pub fn file_name(&self) -> String {
        format!("seg-{:05}.{}", self.index, self.extension)
    }
}

/// Shared initialization chunk referenced by an `EXT-X-MAP` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitSegment {
    /// Absolute source URL
    pub url: String,
    /// Local file name; unique so it never collides with a `seg-NNNNN` name
    pub file_name: String,
}

impl InitSegment {
    pub fn new(url: String, default_extension: &str) -> Self {
        let extension = infer_extension(&url, default_extension);
        let file_name = format!("init-{}.{}", unique_token(), extension);
        Self { url, file_name }
    }
}

/// Timestamp plus random suffix, e.g. `1760601600123-3fa9c1d2`.
fn unique_token() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random();
    format!("{millis}-{suffix:08x}")
}

/// Extension of the last path component of `url` (query and fragment ignored),
/// or `default` when there is no dotted suffix of at most five characters.
pub fn infer_extension(url: &str, default: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let last_component = path.rsplit('/').next().unwrap_or_default();

    match last_component.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.len() <= MAX_EXTENSION_LEN => ext.to_string(),
        _ => default.to_string(),
    }
}
