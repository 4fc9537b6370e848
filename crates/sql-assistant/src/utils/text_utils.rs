//! Text processing utilities

use std::borrow::Cow;
use regex::Regex;
use lazy_static::lazy_static;

lazy_static! {
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();
}

pub struct TextUtils;

impl TextUtils {
    /// Trim, then collapse every whitespace run (newlines included) into one space
    pub fn normalize_whitespace(text: &str) -> Cow<'_, str> {
        let trimmed = text.trim();
        if trimmed.len() != text.len() || trimmed.contains(|c: char| c.is_whitespace() && c != ' ') || trimmed.contains("  ") {
            Cow::Owned(WHITESPACE_REGEX.replace_all(trimmed, " ").into_owned())
        } else {
            Cow::Borrowed(text)
        }
    }

    /// Truncate text to `max_chars` characters, ending in an ellipsis when cut
    pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> Cow<'_, str> {
        if text.chars().count() <= max_chars {
            return Cow::Borrowed(text);
        }
        if max_chars <= 3 {
            return Cow::Borrowed("...");
        }
        let mut result: String = text.chars().take(max_chars - 3).collect();
        result.push_str("...");
        Cow::Owned(result)
    }
}
