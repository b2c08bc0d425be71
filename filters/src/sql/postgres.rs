//! PostgreSQL JSONB WHERE-clause generation

use serde_json::Value as JsonValue;

use super::{
    ConditionTranslator, DEFAULT_METADATA_COLUMN, SqlParams, in_values, unrecognized_expression,
};
use crate::condition::CompareOp;
use crate::error::FilterError;
use crate::utils::sql::{escape_like_pattern, escape_quotes, raw_text};

/// WHERE-clause generator for metadata stored in a PostgreSQL JSONB
/// column.
///
/// Values are extracted as text with `->>` and cast to `numeric` for range
/// comparisons. The column name is an explicit constructor argument; the
/// default reads `cmetadata`.
#[derive(Debug, Clone)]
pub struct PostgresJsonbTranslator {
    json_field: String,
}

impl PostgresJsonbTranslator {
    /// Translator reading from the given JSONB column.
    pub fn new(json_field: impl Into<String>) -> Self {
        Self {
            json_field: json_field.into(),
        }
    }

    /// Text extraction expression for one metadata field.
    fn extract(&self, field: &str) -> String {
        format!("({}->>'{}')", self.json_field, escape_quotes(field))
    }
}

impl Default for PostgresJsonbTranslator {
    fn default() -> Self {
        Self::new(DEFAULT_METADATA_COLUMN)
    }
}

impl ConditionTranslator for PostgresJsonbTranslator {
    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
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
                let quoted: Vec<String> = values
                    .iter()
                    .map(|v| format!("'{}'", escape_quotes(&raw_text(v))))
                    .collect();
                return Ok(format!("{} IN ({})", extracted, quoted.join(",")));
            }
            if let Some(pattern) = map.get("$regex") {
                // LIKE metacharacters pass through untouched in literal mode
                return Ok(format!(
                    "{} LIKE '%{}%'",
                    extracted,
                    escape_quotes(&raw_text(pattern))
                ));
            }
            for op in CompareOp::ALL {
                if let Some(value) = map.get(op.key()) {
                    return Ok(format!(
                        "{}::numeric {} {}",
                        extracted,
                        op.sql_op(),
                        raw_text(value)
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
        Ok(format!(
            "{} = '{}'",
            extracted,
            escape_quotes(&raw_text(expr))
        ))
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
                    .map(|v| self.placeholder(params.push(raw_text(v))))
                    .collect();
                return Ok(format!("{} IN ({})", extracted, placeholders.join(", ")));
            }
            if let Some(pattern) = map.get("$regex") {
                let index = params.push(format!("%{}%", escape_like_pattern(&raw_text(pattern))));
                return Ok(format!(
                    "{} LIKE {} ESCAPE '\\'",
                    extracted,
                    self.placeholder(index)
                ));
            }
            for op in CompareOp::ALL {
                if let Some(value) = map.get(op.key()) {
                    let index = params.push(raw_text(value));
                    return Ok(format!(
                        "{}::numeric {} {}",
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
        let index = params.push(raw_text(expr));
        Ok(format!("{} = {}", extracted, self.placeholder(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Condition, ConditionContainer};
    use serde_json::json;

    fn translate(condition: &Condition) -> String {
        PostgresJsonbTranslator::default()
            .translate(&condition.build())
            .unwrap()
    }

    #[test]
    fn eq_translates_to_text_extraction() {
        let condition = Condition::eq("k", "v").unwrap();
        assert_eq!(translate(&condition), "(cmetadata->>'k') = 'v'");
    }

    #[test]
    fn compare_translates_with_numeric_cast() {
        let condition = Condition::gte("n", 5).unwrap();
        assert_eq!(translate(&condition), "(cmetadata->>'n')::numeric >= 5");

        let condition = Condition::lt("n", 2.5).unwrap();
        assert_eq!(translate(&condition), "(cmetadata->>'n')::numeric < 2.5");
    }

    #[test]
    fn in_translates_to_quoted_csv() {
        let condition = Condition::is_in("tag", vec![json!("a"), json!(2)]).unwrap();
        assert_eq!(translate(&condition), "(cmetadata->>'tag') IN ('a','2')");
    }

    #[test]
    fn regex_translates_to_like_without_escaping() {
        let condition = Condition::contains("name", "50%_off").unwrap();
        assert_eq!(translate(&condition), "(cmetadata->>'name') LIKE '%50%_off%'");
    }

    #[test]
    fn not_translates_to_wrapped_negation() {
        let condition = Condition::not(Condition::eq("status", "active").unwrap());
        assert_eq!(
            translate(&condition),
            "NOT ((cmetadata->>'status') = 'active')"
        );
    }

    #[test]
    fn null_eq_translates_to_is_null() {
        let condition = Condition::eq("archived_at", JsonValue::Null).unwrap();
        assert_eq!(translate(&condition), "(cmetadata->>'archived_at') IS NULL");
    }

    #[test]
    fn and_translates_parenthesized() {
        let condition = Condition::and(vec![
            Condition::eq("a", 1).unwrap(),
            Condition::eq("b", 2).unwrap(),
        ]);
        assert_eq!(
            translate(&condition),
            "((cmetadata->>'a') = '1' AND (cmetadata->>'b') = '2')"
        );
    }

    #[test]
    fn or_translates_parenthesized() {
        let condition = Condition::or(vec![
            Condition::eq("a", 1).unwrap(),
            Condition::gte("b", 2).unwrap(),
        ]);
        assert_eq!(
            translate(&condition),
            "((cmetadata->>'a') = '1' OR (cmetadata->>'b')::numeric >= 2)"
        );
    }

    #[test]
    fn empty_combinators_translate_to_vacuous_clauses() {
        assert_eq!(translate(&Condition::and(vec![])), "(1=1)");
        assert_eq!(translate(&Condition::or(vec![])), "(1=0)");
    }

    #[test]
    fn custom_column_name_is_used() {
        let translator = PostgresJsonbTranslator::new("meta");
        let sql = translator
            .translate(&Condition::eq("k", "v").unwrap().build())
            .unwrap();
        assert_eq!(sql, "(meta->>'k') = 'v'");
    }

    #[test]
    fn quotes_in_fields_and_values_are_doubled() {
        let condition = Condition::eq("it's", "o'clock").unwrap();
        assert_eq!(translate(&condition), "(cmetadata->>'it''s') = 'o''clock'");
    }

    #[test]
    fn unrecognized_expression_is_rejected() {
        let translator = PostgresJsonbTranslator::default();
        let err = translator
            .translate(&json!({ "score": { "$mod": 2 } }))
            .unwrap_err();
        assert!(matches!(err, FilterError::Parse(_)));
    }

    #[test]
    fn params_mode_numbers_placeholders_in_order() {
        let mut container = ConditionContainer::new();
        container
            .add_eq("category", "news")
            .unwrap()
            .add_gte("score", 3)
            .unwrap();
        let fragment = container.to_postgres_params().unwrap();
        assert_eq!(
            fragment.sql,
            "((cmetadata->>'category') = $1 AND (cmetadata->>'score')::numeric >= $2)"
        );
        assert_eq!(fragment.params, vec!["news", "3"]);
    }

    #[test]
    fn params_mode_in_list_expands_placeholders() {
        let condition = Condition::is_in("tag", vec![json!("a"), json!("b")]).unwrap();
        let fragment = PostgresJsonbTranslator::default()
            .translate_params(&condition.build())
            .unwrap();
        assert_eq!(fragment.sql, "(cmetadata->>'tag') IN ($1, $2)");
        assert_eq!(fragment.params, vec!["a", "b"]);
    }

    #[test]
    fn params_mode_escapes_like_patterns() {
        let condition = Condition::contains("name", "50%_off").unwrap();
        let fragment = PostgresJsonbTranslator::default()
            .translate_params(&condition.build())
            .unwrap();
        assert_eq!(fragment.sql, r"(cmetadata->>'name') LIKE $1 ESCAPE '\'");
        assert_eq!(fragment.params, vec![r"%50\%\_off%"]);
    }
}
