//! Best-effort structured extraction from free-text model replies.
//!
//! The inference gateway is a non-contractual text generator: asked for
//! "ONLY a JSON array", it may still wrap the payload in prose or code
//! fences. [`extract_array`] and [`extract_object`] locate the first
//! well-formed bracketed structure in a reply and parse it; when no candidate
//! parses, the result is `None` — never an error. Callers translate `None`
//! into their own empty/absent result.
//!
//! The scan is string-aware: brackets inside JSON string literals (including
//! escaped quotes) do not affect nesting depth.

use serde_json::Value;

/// Extract the first well-formed JSON array embedded in `text`.
pub fn extract_array(text: &str) -> Option<Value> {
    extract_balanced(text, '[', ']')
}

/// Extract the first well-formed JSON object embedded in `text`.
pub fn extract_object(text: &str) -> Option<Value> {
    extract_balanced(text, '{', '}')
}

/// Scan candidate start positions in order; for each, take the balanced
/// `open`…`close` slice and try to parse it. The first slice that parses is
/// the result.
fn extract_balanced(text: &str, open: char, close: char) -> Option<Value> {
    for (start, c) in text.char_indices() {
        if c != open {
            continue;
        }
        if let Some(candidate) = balanced_slice(&text[start..], open, close) {
            if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                return Some(value);
            }
        }
    }
    None
}

/// The shortest prefix of `text` (which starts with `open`) whose brackets
/// balance, or `None` when `text` ends before they do.
fn balanced_slice(text: &str, open: char, close: char) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(&text[..i + c.len_utf8()]);
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
