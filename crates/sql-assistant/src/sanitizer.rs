//! Recovers an executable statement from raw model output.
//!
//! Models are told not to wrap their SQL in markdown fences but regularly do
//! anyway. [`sanitize`] strips the fences and flattens whitespace so the text
//! can be handed to the database as-is.

use lazy_static::lazy_static;
use regex::Regex;

use crate::utils::TextUtils;

lazy_static! {
    /// A markdown fence, with its `sql` tag when it has one, wherever it appears.
    static ref FENCE_TOKEN: Regex = Regex::new(r"(?i)```(?:sql\b)?").unwrap();
}

/// Normalize raw model output into a single-line SQL statement.
///
/// Every fence token is dropped, then the text is trimmed and whitespace
/// runs collapse to one space. Total and idempotent.
pub fn sanitize(raw: &str) -> String {
    let without_fences = FENCE_TOKEN.replace_all(raw, "");
    TextUtils::normalize_whitespace(&without_fences).into_owned()
}
