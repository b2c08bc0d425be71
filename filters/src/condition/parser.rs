//! Parses MongoDB-style filter mappings into condition trees
//!
//! The parser is the structural inverse of [`Condition::build`] for
//! canonical-shape input. Mappings with more than one key per condition
//! level, or expression objects with anything other than exactly one
//! recognized operator, are rejected rather than silently narrowed to
//! their first entry.

use serde_json::{Map, Value as JsonValue};

use super::{CompareOp, Condition, ConditionContainer};
use crate::error::FilterError;

pub(super) fn parse(mapping: &JsonValue) -> Result<ConditionContainer, FilterError> {
    let map = match mapping {
        JsonValue::Object(map) => map,
        other => {
            return Err(FilterError::parse(format!(
                "top-level filter must be a mapping, got {}",
                json_type(other)
            )));
        }
    };

    let mut container = ConditionContainer::new();
    if map.is_empty() {
        return Ok(container);
    }

    let condition = parse_condition(map)?;
    container.push(condition);
    tracing::trace!(name = %container.name, "parsed filter mapping");
    Ok(container)
}

fn parse_condition(d: &Map<String, JsonValue>) -> Result<Condition, FilterError> {
    let (key, value) = single_entry(d)?;

    match key.as_str() {
        "$and" => Ok(Condition::and(parse_list(value, "$and")?)),
        "$or" => Ok(Condition::or(parse_list(value, "$or")?)),
        "$not" => match value {
            JsonValue::Object(inner) => Ok(Condition::not(parse_condition(inner)?)),
            other => Err(FilterError::parse(format!(
                "\"$not\" expects a mapping, got {}",
                json_type(other)
            ))),
        },
        key if key.starts_with('$') => Err(FilterError::parse(format!(
            "unrecognized operator \"{key}\""
        ))),
        field => parse_expression(field, value),
    }
}

fn single_entry(d: &Map<String, JsonValue>) -> Result<(&String, &JsonValue), FilterError> {
    let mut entries = d.iter();
    match (entries.next(), entries.next()) {
        (Some(entry), None) => Ok(entry),
        (None, _) => Err(FilterError::parse("condition mapping must not be empty")),
        (Some(_), Some(_)) => Err(FilterError::parse(format!(
            "condition mapping must have exactly one key, got {}; combine fields with \"$and\"",
            d.len()
        ))),
    }
}

fn parse_list(value: &JsonValue, combinator: &str) -> Result<Vec<Condition>, FilterError> {
    let items = value.as_array().ok_or_else(|| {
        FilterError::parse(format!("\"{combinator}\" expects a list of mappings"))
    })?;
    items
        .iter()
        .map(|item| match item {
            JsonValue::Object(map) => parse_condition(map),
            other => Err(FilterError::parse(format!(
                "\"{combinator}\" entries must be mappings, got {}",
                json_type(other)
            ))),
        })
        .collect()
}

fn parse_expression(field: &str, expr: &JsonValue) -> Result<Condition, FilterError> {
    let map = match expr {
        JsonValue::Object(map) => map,
        // Any non-mapping value, including lists and null, is an equality.
        scalar => return Condition::eq(field, scalar.clone()),
    };

    let mut entries = map.iter();
    let (op, value) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        _ => {
            return Err(FilterError::parse(format!(
                "expression for field \"{field}\" must carry exactly one operator key"
            )));
        }
    };

    match op.as_str() {
        "$in" => {
            let values = value.as_array().ok_or_else(|| {
                FilterError::parse(format!("\"$in\" for field \"{field}\" expects a list"))
            })?;
            Condition::is_in(field, values.clone())
        }
        "$regex" => {
            let substring = value.as_str().ok_or_else(|| {
                FilterError::parse(format!("\"$regex\" for field \"{field}\" expects a string"))
            })?;
            Condition::contains(field, substring)
        }
        "$not" => Ok(Condition::not(parse_expression(field, value)?)),
        op => match op.parse::<CompareOp>() {
            Ok(operator) => Condition::compare_op(field, operator, value.clone()),
            Err(_) => Err(FilterError::parse(format!(
                "unrecognized operator \"{op}\" for field \"{field}\""
            ))),
        },
    }
}

fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a list",
        JsonValue::Object(_) => "a mapping",
    }
}
