//! Extraction of JSON values from model output.
//!
//! Structured-output mode usually returns a clean document, so a strict parse is tried
//! first. When the model wraps the document in prose or code fences, the first
//! bracket/brace-delimited substring is extracted and parsed instead. Anything else is a
//! [`DiscussionError::ParseFailure`], which callers answer with their deterministic fallback.

use crate::error::DiscussionError;
use serde::de::DeserializeOwned;

/// Parse a JSON array out of `raw`.
///
/// The fallback substring runs from the first `[` to the first `]` after it.
pub fn extract_array<T: DeserializeOwned>(raw: &str) -> Result<T, DiscussionError> {
    extract(raw, first_bracketed(raw, '[', ']'))
}

/// Parse a JSON object out of `raw`.
///
/// The fallback substring runs from the first `{` to the last `}`.
pub fn extract_object<T: DeserializeOwned>(raw: &str) -> Result<T, DiscussionError> {
    extract(raw, outermost_braced(raw))
}

fn extract<T: DeserializeOwned>(raw: &str, candidate: Option<&str>) -> Result<T, DiscussionError> {
    let strict_err = match serde_json::from_str::<T>(raw.trim()) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    match candidate {
        Some(slice) => serde_json::from_str::<T>(slice)
            .map_err(|err| DiscussionError::ParseFailure(format!("{} in {:?}", err, preview(slice)))),
        None => Err(DiscussionError::ParseFailure(format!(
            "{} in {:?}",
            strict_err,
            preview(raw)
        ))),
    }
}

fn first_bracketed(raw: &str, open: char, close: char) -> Option<&str> {
    let start = raw.find(open)?;
    let end = raw[start..].find(close)? + start;
    Some(&raw[start..=end])
}

fn outermost_braced(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 80;
    if text.chars().count() <= LIMIT {
        text.to_string()
    } else {
        let head: String = text.chars().take(LIMIT).collect();
        format!("{}...", head)
    }
}
