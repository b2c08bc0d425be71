//! Filter condition model
//!
//! A [`Condition`] is one node of a boolean filter tree. [`Condition::build`]
//! renders the tree as the MongoDB-style nested mapping understood by
//! vector-store metadata filters; the [`crate::sql`] module turns that
//! mapping into WHERE-clause fragments.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};

use crate::error::FilterError;

mod container;
mod parser;

pub use container::ConditionContainer;

/// Comparison operator for range conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum CompareOp {
    #[serde(rename = "$gte")]
    Gte,
    #[serde(rename = "$lte")]
    Lte,
    #[serde(rename = "$gt")]
    Gt,
    #[serde(rename = "$lt")]
    Lt,
}

impl CompareOp {
    /// All operators, in the order expression keys are recognized.
    pub const ALL: [CompareOp; 4] = [CompareOp::Gte, CompareOp::Lte, CompareOp::Gt, CompareOp::Lt];

    /// The `$`-prefixed mapping key for this operator.
    pub fn key(self) -> &'static str {
        match self {
            Self::Gte => "$gte",
            Self::Lte => "$lte",
            Self::Gt => "$gt",
            Self::Lt => "$lt",
        }
    }

    /// The SQL comparison operator.
    pub fn sql_op(self) -> &'static str {
        match self {
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }
}

impl std::str::FromStr for CompareOp {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "$gte" => Ok(Self::Gte),
            "$lte" => Ok(Self::Lte),
            "$gt" => Ok(Self::Gt),
            "$lt" => Ok(Self::Lt),
            other => Err(FilterError::UnsupportedOperator(other.to_string())),
        }
    }
}

/// One node of a filter condition tree.
///
/// Serialized as a tagged union so API and tool-call payloads can carry
/// whole trees; [`Condition::build`] produces the untagged MongoDB-style
/// mapping consumed by vector stores and the SQL translators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Exact match: `{field: value}`.
    Eq { field: String, value: JsonValue },
    /// Membership: `{field: {"$in": values}}`. Value order is preserved.
    In { field: String, values: Vec<JsonValue> },
    /// Substring match: `{field: {"$regex": substring}}`.
    Contains { field: String, substring: String },
    /// Range comparison: `{field: {operator: value}}`.
    Compare {
        field: String,
        operator: CompareOp,
        value: JsonValue,
    },
    /// Conjunction of zero or more conditions. Empty means "no constraint".
    And { conditions: Vec<Condition> },
    /// Disjunction of zero or more conditions. Empty matches nothing.
    Or { conditions: Vec<Condition> },
    /// Negation of a single condition.
    Not { condition: Box<Condition> },
}

impl Condition {
    /// Exact-match condition.
    pub fn eq(field: impl Into<String>, value: impl Into<JsonValue>) -> Result<Self, FilterError> {
        Ok(Self::Eq {
            field: field_name(field)?,
            value: value.into(),
        })
    }

    /// Membership condition over an ordered list of values.
    pub fn is_in(
        field: impl Into<String>,
        values: Vec<JsonValue>,
    ) -> Result<Self, FilterError> {
        Ok(Self::In {
            field: field_name(field)?,
            values,
        })
    }

    /// Substring-match condition.
    pub fn contains(
        field: impl Into<String>,
        substring: impl Into<String>,
    ) -> Result<Self, FilterError> {
        Ok(Self::Contains {
            field: field_name(field)?,
            substring: substring.into(),
        })
    }

    /// Range condition from an operator key such as `"$gte"`.
    pub fn compare(
        field: impl Into<String>,
        operator: &str,
        value: impl Into<JsonValue>,
    ) -> Result<Self, FilterError> {
        Self::compare_op(field, operator.parse()?, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<JsonValue>) -> Result<Self, FilterError> {
        Self::compare_op(field, CompareOp::Gte, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<JsonValue>) -> Result<Self, FilterError> {
        Self::compare_op(field, CompareOp::Lte, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<JsonValue>) -> Result<Self, FilterError> {
        Self::compare_op(field, CompareOp::Gt, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<JsonValue>) -> Result<Self, FilterError> {
        Self::compare_op(field, CompareOp::Lt, value)
    }

    fn compare_op(
        field: impl Into<String>,
        operator: CompareOp,
        value: impl Into<JsonValue>,
    ) -> Result<Self, FilterError> {
        Ok(Self::Compare {
            field: field_name(field)?,
            operator,
            value: value.into(),
        })
    }

    /// Conjunction over `conditions`, in order.
    pub fn and(conditions: Vec<Condition>) -> Self {
        Self::And { conditions }
    }

    /// Disjunction over `conditions`, in order.
    pub fn or(conditions: Vec<Condition>) -> Self {
        Self::Or { conditions }
    }

    /// Negation of `condition`.
    pub fn not(condition: Condition) -> Self {
        Self::Not {
            condition: Box::new(condition),
        }
    }

    /// Re-check the non-empty-field invariant for trees that arrived
    /// through serde rather than the constructors.
    pub fn validate(&self) -> Result<(), FilterError> {
        match self {
            Self::Eq { field, .. }
            | Self::In { field, .. }
            | Self::Contains { field, .. }
            | Self::Compare { field, .. } => {
                if field.is_empty() {
                    return Err(FilterError::validation("field name must not be empty"));
                }
                Ok(())
            }
            Self::And { conditions } | Self::Or { conditions } => {
                conditions.iter().try_for_each(Condition::validate)
            }
            Self::Not { condition } => condition.validate(),
        }
    }

    /// Render this condition as its canonical MongoDB-style mapping.
    pub fn build(&self) -> JsonValue {
        match self {
            Self::Eq { field, value } => single(field, value.clone()),
            Self::In { field, values } => single(field, json!({ "$in": values })),
            Self::Contains { field, substring } => {
                single(field, json!({ "$regex": substring }))
            }
            Self::Compare {
                field,
                operator,
                value,
            } => single(field, single(operator.key(), value.clone())),
            Self::And { conditions } => single("$and", build_all(conditions)),
            Self::Or { conditions } => single("$or", build_all(conditions)),
            Self::Not { condition } => condition.negated(),
        }
    }

    /// Canonical mapping of the negation of `self`.
    ///
    /// Leaves wrap their expression in `$not`, inheriting the field key.
    /// Combinators are rewritten through De Morgan so the output stays a
    /// well-formed mapping: `NOT (a AND b)` becomes `(NOT a) OR (NOT b)`
    /// and vice versa; a doubly negated condition builds as itself.
    fn negated(&self) -> JsonValue {
        match self {
            Self::Eq { field, value } => single(field, single("$not", value.clone())),
            Self::In { field, values } => {
                single(field, single("$not", json!({ "$in": values })))
            }
            Self::Contains { field, substring } => {
                single(field, single("$not", json!({ "$regex": substring })))
            }
            Self::Compare {
                field,
                operator,
                value,
            } => single(field, single("$not", single(operator.key(), value.clone()))),
            Self::And { conditions } => single("$or", negate_all(conditions)),
            Self::Or { conditions } => single("$and", negate_all(conditions)),
            Self::Not { condition } => condition.build(),
        }
    }
}

fn field_name(field: impl Into<String>) -> Result<String, FilterError> {
    let field = field.into();
    if field.is_empty() {
        return Err(FilterError::validation("field name must not be empty"));
    }
    Ok(field)
}

fn single(key: &str, value: JsonValue) -> JsonValue {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    JsonValue::Object(map)
}

fn build_all(conditions: &[Condition]) -> JsonValue {
    JsonValue::Array(conditions.iter().map(Condition::build).collect())
}

fn negate_all(conditions: &[Condition]) -> JsonValue {
    JsonValue::Array(conditions.iter().map(Condition::negated).collect())
}
