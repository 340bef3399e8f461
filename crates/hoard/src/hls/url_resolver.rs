use tracing::{trace, warn};
use url::Url;

/// Resolve `reference` against the absolute `base` URL.
///
/// Absolute references pass through, scheme-relative and path-relative ones are
/// joined per RFC 3986. When `base` is not a valid absolute URL the reference is
/// returned unchanged; a bad result then surfaces as a download failure naming it.
pub fn resolve_url(base: &str, reference: &str) -> String {
    match Url::parse(base).and_then(|b| b.join(reference)) {
        Ok(resolved) => {
            trace!("Resolved URI: {} + {} -> {}", base, reference, resolved);
            resolved.into()
        }
        Err(e) => {
            warn!(base, reference, error = %e, "Could not resolve reference, using it as-is");
            reference.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_relative() {
        assert_eq!(
            resolve_url("https://cdn/x/master", "1080/index"),
            "https://cdn/x/1080/index"
        );
        assert_eq!(
            resolve_url("https://cdn/x/1080/index", "../audio/seg1.aac"),
            "https://cdn/x/audio/seg1.aac"
        );
    }

    #[test]
    fn root_relative() {
        assert_eq!(
            resolve_url("https://cdn.example.com/a/b/index.m3u8?token=1", "/seg/1.ts"),
            "https://cdn.example.com/seg/1.ts"
        );
    }

    #[test]
    fn scheme_relative() {
        assert_eq!(
            resolve_url("https://cdn.example.com/a/index.m3u8", "//other.example.com/1.ts"),
            "https://other.example.com/1.ts"
        );
    }

    #[test]
    fn absolute_passes_through() {
        assert_eq!(
            resolve_url("https://cdn.example.com/a/index.m3u8", "http://mirror.example.com/1.ts"),
            "http://mirror.example.com/1.ts"
        );
    }

    #[test]
    fn malformed_base_returns_reference() {
        assert_eq!(resolve_url("not a url", "seg1.ts"), "seg1.ts");
    }
}
