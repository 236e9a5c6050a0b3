//! Locate and parse a JSON value embedded in free-form model output.
//!
//! Models asked for "JSON only" still wrap replies in prose or code fences.
//! [`extract_json`] scans for balanced `[...]` or `{...}` spans, ignoring
//! delimiters inside JSON string literals, and returns the first span that
//! deserializes into the expected type. Spans nested inside one that already
//! failed are not tried, so a broken payload is never mistaken for one of its
//! inner values. If no balanced span parses, the greedy span from the first
//! opening delimiter to the last closing one is tried as a last resort.

use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Array,
    Object,
}

impl Delimiter {
    fn open(self) -> u8 {
        match self {
            Self::Array => b'[',
            Self::Object => b'{',
        }
    }

    fn close(self) -> u8 {
        match self {
            Self::Array => b']',
            Self::Object => b'}',
        }
    }
}

/// Result of scanning a reply for a JSON value of type `T`.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction<T> {
    Parsed(T),
    /// The reply contains no delimited span at all.
    NotFound,
    /// Spans were found but none deserialized as `T`.
    Malformed { reason: String },
}

/// Shape-free summary of an [`Extraction`], kept next to degraded results so
/// callers can tell "the model found nothing" from "the reply was unusable".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionOutcome {
    Parsed,
    NotFound,
    Malformed,
}

impl<T> Extraction<T> {
    #[must_use]
    pub fn outcome(&self) -> ExtractionOutcome {
        match self {
            Self::Parsed(_) => ExtractionOutcome::Parsed,
            Self::NotFound => ExtractionOutcome::NotFound,
            Self::Malformed { .. } => ExtractionOutcome::Malformed,
        }
    }

    #[must_use]
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Parsed(v) => Some(v),
            Self::NotFound | Self::Malformed { .. } => None,
        }
    }

    /// Extraction failure degrades to `T::default()`; never an error.
    #[must_use]
    pub fn into_value_or_empty(self) -> T
    where
        T: Default,
    {
        self.ok().unwrap_or_default()
    }
}

/// Find the first JSON value of shape `T` delimited by `delim` inside `text`.
pub fn extract_json<T: DeserializeOwned>(text: &str, delim: Delimiter) -> Extraction<T> {
    let open = delim.open();
    let close = delim.close();
    let mut span_seen = false;
    let mut first_error: Option<String> = None;
    // End (exclusive) of the last balanced span that failed to parse.
    let mut failed_until = 0;

    for (start, _) in text.match_indices(char::from(open)) {
        if start < failed_until {
            continue;
        }
        let Some(end) = balanced_end(text.as_bytes(), start, open, close) else {
            continue;
        };
        span_seen = true;
        match serde_json::from_str::<T>(&text[start..=end]) {
            Ok(value) => return Extraction::Parsed(value),
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e.to_string());
                }
                failed_until = end + 1;
            }
        }
    }

    if let (Some(start), Some(end)) = (text.find(char::from(open)), text.rfind(char::from(close)))
        && start < end
    {
        span_seen = true;
        match serde_json::from_str::<T>(&text[start..=end]) {
            Ok(value) => return Extraction::Parsed(value),
            Err(e) if first_error.is_none() => first_error = Some(e.to_string()),
            Err(_) => {}
        }
    }

    if span_seen {
        Extraction::Malformed {
            reason: first_error.unwrap_or_default(),
        }
    } else {
        Extraction::NotFound
    }
}

/// Byte index of the delimiter closing the one at `start`, skipping string literals.
fn balanced_end(bytes: &[u8], start: usize, open: u8, close: u8) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        if b == b'"' {
            in_string = true;
        } else if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}
