//! MySQL string escaping and literal rendering.
//!
//! Bulk inserts are rendered as full SQL text rather than bound parameters, so
//! every text cell must be escaped by the same rules the MySQL client library
//! uses: backslash-escape backslashes, both quote characters, NUL, LF, CR and
//! ctrl-Z.

use crate::models::SqlValue;

/// Escapes a string for inclusion inside a single-quoted MySQL literal.
pub fn escape_string(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len() + 2);
    for ch in input.chars() {
        match ch {
            '\0' => escaped.push_str("\\0"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\x1a' => escaped.push_str("\\Z"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Renders one cell as a SQL literal.
pub fn literal(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::UInt(number) => number.to_string(),
        SqlValue::Text(text) => format!("'{}'", escape_string(text)),
    }
}
