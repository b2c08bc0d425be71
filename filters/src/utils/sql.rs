//! SQL text helpers: LIKE-pattern escaping and literal formatting

use serde_json::Value as JsonValue;

/// Escape SQL LIKE metacharacters (%, _, \) in user input
///
/// Use this when building LIKE patterns from user input to prevent
/// unintended pattern matching. Pair the result with an `ESCAPE '\'`
/// clause.
pub fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Double single quotes for embedding text in a SQL string literal.
pub fn escape_quotes(s: &str) -> String {
    s.replace('\'', "''")
}

/// Format a JSON value as a typed SQL literal.
///
/// Null maps to `NULL`, booleans to `1`/`0` (JSON1 stores booleans as
/// integers), numbers stay unquoted, everything else becomes a quoted
/// string.
pub fn sql_literal(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::Bool(true) => "1".to_string(),
        JsonValue::Bool(false) => "0".to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => format!("'{}'", escape_quotes(s)),
        other => format!("'{}'", escape_quotes(&other.to_string())),
    }
}

/// Text form of a JSON value as PostgreSQL `->>` yields it: strings
/// unquoted, everything else in JSON notation.
pub fn raw_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Bind-value text matching SQLite `json_extract` output: booleans as
/// integers, strings unquoted.
pub fn bind_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Bool(true) => "1".to_string(),
        JsonValue::Bool(false) => "0".to_string(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
