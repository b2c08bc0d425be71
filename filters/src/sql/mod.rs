//! SQL WHERE-clause generation from canonical filter mappings
//!
//! Both backends share one mapping-walk skeleton and differ only in field
//! extraction syntax, casting, and literal formatting. Each backend renders
//! two forms: literal text (the compatibility surface the golden tests pin
//! down) and a parameterized fragment with backend-specific placeholders.

mod postgres;
mod sqlite;

pub use postgres::PostgresJsonbTranslator;
pub use sqlite::SqliteJsonTranslator;

use serde_json::{Map, Value as JsonValue};

use crate::error::FilterError;

/// Default JSON metadata column queried by both backends.
pub const DEFAULT_METADATA_COLUMN: &str = "cmetadata";

/// Collects bind values during parameterized query building
/// (maintains insertion order).
#[derive(Debug, Default)]
pub struct SqlParams {
    pub values: Vec<String>,
}

impl SqlParams {
    /// Append a bind value and return its 1-based placeholder index.
    pub fn push(&mut self, value: impl Into<String>) -> usize {
        self.values.push(value.into());
        self.values.len()
    }
}

/// A WHERE-clause fragment plus its bind values, in placeholder order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<String>,
}

/// Renders canonical filter mappings as SQL for one JSON storage
/// convention.
///
/// Translation is pure and stateless: it consumes the mapping produced by
/// `build()`, never the condition tree itself.
pub trait ConditionTranslator {
    /// Placeholder for the `index`-th bind value (1-based).
    fn placeholder(&self, index: usize) -> String;

    /// Literal-text clause for one `field: expression` pair.
    fn translate_field(&self, field: &str, expr: &JsonValue) -> Result<String, FilterError>;

    /// Parameterized clause for one `field: expression` pair.
    fn translate_field_params(
        &self,
        field: &str,
        expr: &JsonValue,
        params: &mut SqlParams,
    ) -> Result<String, FilterError>;

    /// Render a canonical mapping as literal SQL text.
    fn translate(&self, condition: &JsonValue) -> Result<String, FilterError> {
        self.translate_map(as_mapping(condition)?)
    }

    /// Render a canonical mapping as SQL with bind placeholders.
    fn translate_params(&self, condition: &JsonValue) -> Result<SqlFragment, FilterError> {
        let mut params = SqlParams::default();
        let sql = self.translate_map_params(as_mapping(condition)?, &mut params)?;
        Ok(SqlFragment {
            sql,
            params: params.values,
        })
    }

    /// Mapping walk shared by both backends: combinator keys recurse over
    /// their children and join parenthesized, every other key is a field
    /// clause. Top-level clauses join with `AND`.
    fn translate_map(&self, d: &Map<String, JsonValue>) -> Result<String, FilterError> {
        let mut clauses = Vec::new();
        for (key, value) in d {
            match key.as_str() {
                "$and" => clauses.push(join_combinator(key, value, " AND ", "(1=1)", |m| {
                    self.translate_map(m)
                })?),
                "$or" => clauses.push(join_combinator(key, value, " OR ", "(1=0)", |m| {
                    self.translate_map(m)
                })?),
                key if key.starts_with('$') => {
                    return Err(FilterError::parse(format!(
                        "unrecognized combinator \"{key}\""
                    )));
                }
                field => clauses.push(self.translate_field(field, value)?),
            }
        }
        Ok(clauses.join(" AND "))
    }

    /// Parameterized twin of [`translate_map`](Self::translate_map).
    fn translate_map_params(
        &self,
        d: &Map<String, JsonValue>,
        params: &mut SqlParams,
    ) -> Result<String, FilterError> {
        let mut clauses = Vec::new();
        for (key, value) in d {
            match key.as_str() {
                "$and" => clauses.push(join_combinator(key, value, " AND ", "(1=1)", |m| {
                    self.translate_map_params(m, params)
                })?),
                "$or" => clauses.push(join_combinator(key, value, " OR ", "(1=0)", |m| {
                    self.translate_map_params(m, params)
                })?),
                key if key.starts_with('$') => {
                    return Err(FilterError::parse(format!(
                        "unrecognized combinator \"{key}\""
                    )));
                }
                field => clauses.push(self.translate_field_params(field, value, params)?),
            }
        }
        Ok(clauses.join(" AND "))
    }
}

/// Recurse over a combinator's children and join the rendered clauses.
///
/// An empty `$and` is vacuously true and an empty `$or` vacuously false;
/// they render as `(1=1)` and `(1=0)` instead of invalid empty parens.
fn join_combinator<F>(
    key: &str,
    value: &JsonValue,
    separator: &str,
    vacuous: &str,
    mut render: F,
) -> Result<String, FilterError>
where
    F: FnMut(&Map<String, JsonValue>) -> Result<String, FilterError>,
{
    let items = value.as_array().ok_or_else(|| {
        FilterError::parse(format!("\"{key}\" expects a list of mappings"))
    })?;
    if items.is_empty() {
        return Ok(vacuous.to_string());
    }
    let mut rendered = Vec::with_capacity(items.len());
    for item in items {
        rendered.push(render(as_mapping(item)?)?);
    }
    Ok(format!("({})", rendered.join(separator)))
}

fn as_mapping(value: &JsonValue) -> Result<&Map<String, JsonValue>, FilterError> {
    value
        .as_object()
        .ok_or_else(|| FilterError::parse("filter condition must be a mapping"))
}

/// Payload of an `$in` expression, which must be a list.
fn in_values<'a>(field: &str, value: &'a JsonValue) -> Result<&'a Vec<JsonValue>, FilterError> {
    value.as_array().ok_or_else(|| {
        FilterError::parse(format!("\"$in\" for field \"{field}\" expects a list"))
    })
}

fn unrecognized_expression(field: &str, map: &Map<String, JsonValue>) -> FilterError {
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    FilterError::parse(format!(
        "unrecognized operator expression for field \"{field}\": [{}]",
        keys.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_params_push_returns_one_based_index() {
        let mut params = SqlParams::default();
        assert_eq!(params.push("a"), 1);
        assert_eq!(params.push("b"), 2);
        assert_eq!(params.values, vec!["a", "b"]);
    }
}
