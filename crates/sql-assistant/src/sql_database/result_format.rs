//! Textual rendering of query results.
//!
//! Rows come out as a list of tuples (`[('AC/DC',), ('Accept',)]`), the shape
//! language models have seen most often for SQL results.

use rusqlite::types::ValueRef;

use crate::utils::TextUtils;

/// Cell text longer than this is cut and suffixed with `...`.
pub const MAX_CELL_CHARS: usize = 100;

/// Quoted literal form of a cell, used inside result tuples.
pub fn render_literal(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "None".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => format!("{:?}", f),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            quote(&TextUtils::truncate_with_ellipsis(&text, MAX_CELL_CHARS))
        }
        ValueRef::Blob(bytes) => format!("b'<{} bytes>'", bytes.len()),
    }
}

/// Bare form of a cell, used in schema sample rows.
pub fn render_plain(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            TextUtils::truncate_with_ellipsis(&text, MAX_CELL_CHARS).into_owned()
        }
        other => render_literal(other),
    }
}

/// `(a, b)`, with the trailing comma a one-element tuple needs.
pub fn render_tuple(cells: &[String]) -> String {
    match cells {
        [single] => format!("({},)", single),
        _ => format!("({})", cells.join(", ")),
    }
}

/// Empty string for no rows, otherwise `[row, row, ...]`.
pub fn render_rows(rows: &[String]) -> String {
    if rows.is_empty() {
        String::new()
    } else {
        format!("[{}]", rows.join(", "))
    }
}

/// Single quotes unless the text holds a single quote and no double quote.
fn quote(text: &str) -> String {
    let delimiter = if text.contains('\'') && !text.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(delimiter);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals() {
        assert_eq!(render_literal(ValueRef::Null), "None");
        assert_eq!(render_literal(ValueRef::Integer(42)), "42");
        assert_eq!(render_literal(ValueRef::Real(0.99)), "0.99");
        assert_eq!(render_literal(ValueRef::Real(2.0)), "2.0");
        assert_eq!(render_literal(ValueRef::Text(b"AC/DC")), "'AC/DC'");
        assert_eq!(render_literal(ValueRef::Blob(&[1, 2, 3])), "b'<3 bytes>'");
    }

    #[test]
    fn test_quote_switches_delimiter_for_apostrophes() {
        assert_eq!(render_literal(ValueRef::Text(b"Guns N' Roses")), "\"Guns N' Roses\"");
        assert_eq!(render_literal(ValueRef::Text(b"It's \"x\"")), "'It\\'s \"x\"'");
    }

    #[test]
    fn test_plain_text_is_unquoted() {
        assert_eq!(render_plain(ValueRef::Text(b"Accept")), "Accept");
        assert_eq!(render_plain(ValueRef::Integer(1)), "1");
    }

    #[test]
    fn test_long_text_truncated() {
        let long = "x".repeat(250);
        let rendered = render_literal(ValueRef::Text(long.as_bytes()));
        assert_eq!(rendered.chars().count(), MAX_CELL_CHARS + 2);
        assert!(rendered.ends_with("...'"));
    }

    #[test]
    fn test_tuples_and_rows() {
        assert_eq!(render_tuple(&["'AC/DC'".to_string()]), "('AC/DC',)");
        assert_eq!(render_tuple(&["1".to_string(), "'AC/DC'".to_string()]), "(1, 'AC/DC')");
        assert_eq!(render_rows(&[]), "");
        assert_eq!(
            render_rows(&["('AC/DC',)".to_string(), "('Accept',)".to_string()]),
            "[('AC/DC',), ('Accept',)]"
        );
    }
}
