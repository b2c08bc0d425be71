//! SQLite JSON1 WHERE-clause generation

use serde_json::Value as JsonValue;

use super::{
    ConditionTranslator, DEFAULT_METADATA_COLUMN, SqlParams, in_values, unrecognized_expression,
};
use crate::condition::CompareOp;
use crate::error::FilterError;
use crate::utils::sql::{bind_text, escape_like_pattern, escape_quotes, raw_text, sql_literal};

/// WHERE-clause generator for metadata stored in a SQLite JSON text
/// column, read through the JSON1 `json_extract` function.
///
/// SQLite has no built-in regular expressions, so `$regex` maps to an
/// escaped `LIKE` pattern. Range comparisons cast the extracted value to
/// `REAL`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteJsonTranslator;

impl SqliteJsonTranslator {
    /// JSON1 extraction expression for one metadata field.
    fn extract(&self, field: &str) -> String {
        format!(
            "json_extract({}, '$.{}')",
            DEFAULT_METADATA_COLUMN,
            escape_quotes(field)
        )
    }
}

impl ConditionTranslator for SqliteJsonTranslator {
    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn translate_field(&self, field: &str, expr: &JsonValue) -> Result<String, FilterError> {
        let extracted = self.extract(field);

        if let JsonValue::Object(map) = expr {
            if let Some(value) = map.get("$in") {
                let values = in_values(field, value)?;
                if values.is_empty() {
                    // IN over an empty list matches nothing
                    return Ok("(1=0)".to_string());
                }
                let literals: Vec<String> = values.iter().map(sql_literal).collect();
                return Ok(format!("{} IN ({})", extracted, literals.join(",")));
            }
            if let Some(pattern) = map.get("$regex") {
                let pattern = escape_quotes(&escape_like_pattern(&raw_text(pattern)));
                return Ok(format!("{} LIKE '%{}%' ESCAPE '\\'", extracted, pattern));
            }
            for op in CompareOp::ALL {
                if let Some(value) = map.get(op.key()) {
                    return Ok(format!(
                        "CAST({} AS REAL) {} {}",
                        extracted,
                        op.sql_op(),
                        sql_literal(value)
                    ));
                }
            }
            if let Some(inner) = map.get("$not") {
                return Ok(format!("NOT ({})", self.translate_field(field, inner)?));
            }
            return Err(unrecognized_expression(field, map));
        }

        if expr.is_null() {
            return Ok(format!("{} IS NULL", extracted));
        }
        Ok(format!("{} = {}", extracted, sql_literal(expr)))
    }

    fn translate_field_params(
        &self,
        field: &str,
        expr: &JsonValue,
        params: &mut SqlParams,
    ) -> Result<String, FilterError> {
        let extracted = self.extract(field);

        if let JsonValue::Object(map) = expr {
            if let Some(value) = map.get("$in") {
                let values = in_values(field, value)?;
                if values.is_empty() {
                    return Ok("(1=0)".to_string());
                }
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|v| self.placeholder(params.push(bind_text(v))))
                    .collect();
                return Ok(format!("{} IN ({})", extracted, placeholders.join(", ")));
            }
            if let Some(pattern) = map.get("$regex") {
                let index = params.push(format!("%{}%", escape_like_pattern(&bind_text(pattern))));
                return Ok(format!(
                    "{} LIKE {} ESCAPE '\\'",
                    extracted,
                    self.placeholder(index)
                ));
            }
            for op in CompareOp::ALL {
                if let Some(value) = map.get(op.key()) {
                    let index = params.push(bind_text(value));
                    return Ok(format!(
                        "CAST({} AS REAL) {} {}",
                        extracted,
                        op.sql_op(),
                        self.placeholder(index)
                    ));
                }
            }
            if let Some(inner) = map.get("$not") {
                return Ok(format!(
                    "NOT ({})",
                    self.translate_field_params(field, inner, params)?
                ));
            }
            return Err(unrecognized_expression(field, map));
        }

        if expr.is_null() {
            return Ok(format!("{} IS NULL", extracted));
        }
        let index = params.push(bind_text(expr));
        Ok(format!("{} = {}", extracted, self.placeholder(index)))
    }
}
