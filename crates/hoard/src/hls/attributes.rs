//! Attribute lists of HLS tags (`KEY=VALUE,KEY="quoted, value"`).
//!
//! Values are stored exactly as they appeared in the source, so quoted values keep
//! their quotes and re-serialize unchanged. Callers pick the form they need through
//! [`AttributeList::raw`] or [`AttributeList::unquoted`].

use std::fmt;

use tracing::trace;

/// Ordered `key -> value` dictionary parsed from one tag's attribute list.
///
/// A key that occurs more than once keeps its first position but takes the value
/// of its last occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeList {
    entries: Vec<(String, String)>,
}

impl AttributeList {
    /// Parse the text following a tag's colon.
    ///
    /// Commas inside double quotes do not separate entries. Entries without `=`
    /// are dropped.
    pub fn parse(input: &str) -> Self {
        let mut list = Self::default();
        let mut in_quotes = false;
        let mut start = 0usize;

        for (idx, ch) in input.char_indices() {
            match ch {
                '"' => in_quotes = !in_quotes,
                ',' if !in_quotes => {
                    list.push_entry(&input[start..idx]);
                    start = idx + 1;
                }
                _ => {}
            }
        }
        if start < input.len() {
            list.push_entry(&input[start..]);
        }

        list
    }

    fn push_entry(&mut self, entry: &str) {
        let Some((key, value)) = entry.split_once('=') else {
            if !entry.trim().is_empty() {
                trace!(entry, "Dropping attribute without '='");
            }
            return;
        };
        self.insert(key.trim(), value.trim());
    }

    /// Insert a raw value, replacing any previous value for `key` in place.
    pub fn insert(&mut self, key: impl Into<String>, raw_value: impl Into<String>) {
        let key = key.into();
        let raw_value = raw_value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, value)) => *value = raw_value,
            None => self.entries.push((key, raw_value)),
        }
    }

    /// Store `value` wrapped in double quotes.
    pub fn set_quoted(&mut self, key: impl Into<String>, value: &str) {
        self.insert(key, format!("\"{value}\""));
    }

    /// The value as written in the source, quotes included.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The value with one pair of surrounding double quotes removed, if present.
    pub fn unquoted(&self, key: &str) -> Option<&str> {
        self.raw(key).map(unquote)
    }

    /// Parse an unquoted decimal integer attribute such as `BANDWIDTH`.
    pub fn decimal(&self, key: &str) -> Option<u64> {
        self.unquoted(key).and_then(|v| v.parse().ok())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for AttributeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (key, value)) in self.entries.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(value)
}
