use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error};

use crate::error::AppError;

/// Parses `Name: Value` strings (as given to `-H`) into a [`HeaderMap`].
///
/// The split happens at the first `:`; surrounding whitespace is trimmed from
/// both halves. Repeating a name appends another value instead of replacing it.
///
/// # Errors
///
/// Returns `AppError::InvalidInput` when an entry has no `:` or when the name or
/// value is not a valid HTTP header.
pub fn parse_headers(raw: &[String]) -> Result<HeaderMap, AppError> {
    debug!("Parsing {} headers", raw.len());

    let mut headers = HeaderMap::with_capacity(raw.len());
    for entry in raw {
        let (name, value) = entry.split_once(':').ok_or_else(|| {
            error!("Invalid header format: {entry}");
            AppError::InvalidInput(format!("Invalid header format (expected `Name: Value`): {entry}"))
        })?;

        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|e| AppError::InvalidInput(format!("Invalid header name in `{entry}`: {e}")))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|e| AppError::InvalidInput(format!("Invalid header value in `{entry}`: {e}")))?;

        debug!(header = %name, "Added header");
        headers.append(name, value);
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_name_value_pairs() {
        let headers = parse_headers(&strings(&[
            "Referer: https://site.example/",
            "Authorization:Bearer a:b",
        ]))
        .unwrap();

        assert_eq!(headers["referer"], "https://site.example/");
        assert_eq!(headers["authorization"], "Bearer a:b");
    }

    #[test]
    fn repeated_names_are_kept() {
        let headers = parse_headers(&strings(&["Cookie: a=1", "Cookie: b=2"])).unwrap();
        let values: Vec<_> = headers.get_all("cookie").iter().collect();
        assert_eq!(values, vec!["a=1", "b=2"]);
    }

    #[test]
    fn rejects_missing_separator() {
        assert!(matches!(
            parse_headers(&strings(&["no-separator"])),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_invalid_name() {
        assert!(parse_headers(&strings(&["bad name: v"])).is_err());
    }

    #[test]
    fn empty_input_is_empty_map() {
        assert!(parse_headers(&[]).unwrap().is_empty());
    }
}
