use crate::hls::manifest::{MAP_TAG, ManifestLine, TerminalManifest};

/// Render `manifest` with every segment and init-segment reference replaced by
/// its local file name.
///
/// Lines keep the source order. Names carry no directory prefix: the playlist
/// sits next to the files it references.
pub fn rewrite(manifest: &TerminalManifest) -> String {
    let mut out = String::new();

    for line in &manifest.lines {
        match line {
            ManifestLine::Blank => {}
            ManifestLine::Directive(text) => out.push_str(text),
            ManifestLine::Map { attributes, init } => {
                let mut attributes = attributes.clone();
                attributes.set_quoted("URI", &manifest.init_segments[*init].file_name);
                out.push_str(MAP_TAG);
                out.push_str(&attributes.to_string());
            }
            ManifestLine::Segment { segment } => {
                out.push_str(&manifest.segments[*segment].file_name());
            }
        }
        out.push('\n');
    }

    out
}
