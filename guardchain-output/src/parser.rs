//! JSON extraction from raw model text.
//!
//! Models asked for "JSON only" still wrap their answer in markdown
//! fences or prose often enough that extraction has to be tolerant.
//! [`extract_json`] tries, in order: the whole text, a ```json fence, an
//! unlabelled fence, and finally the first balanced object or array
//! found by a string-aware scanner.

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::OutputParseError;

/// Extract a JSON document from text that may contain markdown or prose.
///
/// # Example
///
/// ```rust
/// use guardchain_output::parser::extract_json;
///
/// let text = "Here you go:\n```json\n{\"name\": \"Ada\"}\n```";
/// assert_eq!(extract_json(text).unwrap(), "{\"name\": \"Ada\"}");
/// ```
pub fn extract_json(text: &str) -> Result<String, OutputParseError> {
    let text = text.trim();

    if serde_json::from_str::<JsonValue>(text).is_ok() {
        return Ok(text.to_string());
    }

    for language in ["json", ""] {
        if let Some(candidate) = fenced_block(text, language) {
            if serde_json::from_str::<JsonValue>(&candidate).is_ok() {
                return Ok(candidate);
            }
        }
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let Some(candidate) = balanced_span(text, open, close) {
            if serde_json::from_str::<JsonValue>(candidate).is_ok() {
                return Ok(candidate.to_string());
            }
        }
    }

    Err(OutputParseError::NoJson)
}

/// Extract and parse JSON into a typed value in one step.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, OutputParseError> {
    let document = extract_json(text)?;
    serde_json::from_str(&document).map_err(OutputParseError::Json)
}

/// Check whether text plausibly contains a JSON document.
#[must_use]
pub fn contains_json(text: &str) -> bool {
    let text = text.trim();
    text.starts_with('{') || text.starts_with('[') || text.contains("```json")
}

/// Content of the first markdown fence with the given language tag.
///
/// An empty `language` matches a fence with any (or no) tag.
fn fenced_block(text: &str, language: &str) -> Option<String> {
    let marker = format!("```{language}");
    let start = text.find(&marker)?;
    let after_marker = &text[start + marker.len()..];
    // Skip the rest of the fence line (a tag we didn't ask for, trailing
    // whitespace) so the content starts on the next line.
    let body = match after_marker.find('\n') {
        Some(newline) => &after_marker[newline + 1..],
        None => after_marker,
    };
    let end = body.find("```")?;
    Some(body[..end].trim().to_string())
}

/// The first balanced `open`..`close` span, honoring JSON string
/// literals and escapes.
fn balanced_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}
