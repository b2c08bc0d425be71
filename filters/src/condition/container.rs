//! Ordered, named collection of top-level filter conditions

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use super::{Condition, build_all, parser, single};
use crate::error::FilterError;
use crate::sql::{
    ConditionTranslator, PostgresJsonbTranslator, SqlFragment, SqliteJsonTranslator,
};

fn default_name() -> String {
    Uuid::new_v4().to_string()
}

/// Ordered, named collection of top-level conditions.
///
/// Multiple top-level conditions combine as an implicit conjunction.
/// The container exclusively owns its condition list; conditions are
/// immutable value objects appended through the `add_*` methods and
/// consumed read-only by [`build`](Self::build) and the translators.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConditionContainer {
    /// Container identifier, a fresh UUID unless supplied.
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Open metadata, not interpreted by the filter core.
    #[serde(default)]
    pub metadata: Map<String, JsonValue>,
}

impl Default for ConditionContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionContainer {
    /// Empty container with a generated name.
    pub fn new() -> Self {
        Self {
            name: default_name(),
            conditions: Vec::new(),
            metadata: Map::new(),
        }
    }

    /// Empty container with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::new()
        }
    }

    /// Parse a MongoDB-style filter mapping into a container holding a
    /// single top-level condition. An empty mapping yields an empty
    /// container ("no filter").
    pub fn from_dict(mapping: &JsonValue) -> Result<Self, FilterError> {
        parser::parse(mapping)
    }

    /// Append an already-constructed condition.
    pub fn push(&mut self, condition: Condition) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    pub fn add_eq(
        &mut self,
        field: impl Into<String>,
        value: impl Into<JsonValue>,
    ) -> Result<&mut Self, FilterError> {
        let condition = Condition::eq(field, value)?;
        Ok(self.push(condition))
    }

    pub fn add_in(
        &mut self,
        field: impl Into<String>,
        values: Vec<JsonValue>,
    ) -> Result<&mut Self, FilterError> {
        let condition = Condition::is_in(field, values)?;
        Ok(self.push(condition))
    }

    pub fn add_contains(
        &mut self,
        field: impl Into<String>,
        substring: impl Into<String>,
    ) -> Result<&mut Self, FilterError> {
        let condition = Condition::contains(field, substring)?;
        Ok(self.push(condition))
    }

    /// Append a range condition from an operator key such as `"$gte"`.
    pub fn add_compare(
        &mut self,
        field: impl Into<String>,
        operator: &str,
        value: impl Into<JsonValue>,
    ) -> Result<&mut Self, FilterError> {
        let condition = Condition::compare(field, operator, value)?;
        Ok(self.push(condition))
    }

    pub fn add_gte(
        &mut self,
        field: impl Into<String>,
        value: impl Into<JsonValue>,
    ) -> Result<&mut Self, FilterError> {
        let condition = Condition::gte(field, value)?;
        Ok(self.push(condition))
    }

    pub fn add_lte(
        &mut self,
        field: impl Into<String>,
        value: impl Into<JsonValue>,
    ) -> Result<&mut Self, FilterError> {
        let condition = Condition::lte(field, value)?;
        Ok(self.push(condition))
    }

    pub fn add_gt(
        &mut self,
        field: impl Into<String>,
        value: impl Into<JsonValue>,
    ) -> Result<&mut Self, FilterError> {
        let condition = Condition::gt(field, value)?;
        Ok(self.push(condition))
    }

    pub fn add_lt(
        &mut self,
        field: impl Into<String>,
        value: impl Into<JsonValue>,
    ) -> Result<&mut Self, FilterError> {
        let condition = Condition::lt(field, value)?;
        Ok(self.push(condition))
    }

    pub fn add_and(&mut self, conditions: Vec<Condition>) -> &mut Self {
        self.push(Condition::and(conditions))
    }

    pub fn add_or(&mut self, conditions: Vec<Condition>) -> &mut Self {
        self.push(Condition::or(conditions))
    }

    pub fn add_not(&mut self, condition: Condition) -> &mut Self {
        self.push(Condition::not(condition))
    }

    /// Render the canonical mapping: `{}` for no conditions, the single
    /// condition's mapping unwrapped, or an implicit `$and` over all of
    /// them in insertion order.
    pub fn build(&self) -> JsonValue {
        match self.conditions.as_slice() {
            [] => JsonValue::Object(Map::new()),
            [condition] => condition.build(),
            conditions => single("$and", build_all(conditions)),
        }
    }

    /// WHERE-clause fragment for a PostgreSQL JSONB metadata column.
    ///
    /// Uses the default `cmetadata` column; construct a
    /// [`PostgresJsonbTranslator`] directly to read a different column.
    /// An empty container yields an empty string ("no filter").
    pub fn to_postgres_sql(&self) -> Result<String, FilterError> {
        if self.conditions.is_empty() {
            return Ok(String::new());
        }
        PostgresJsonbTranslator::default().translate(&self.build())
    }

    /// WHERE-clause fragment reading a specific JSONB column.
    pub fn to_postgres_sql_for(&self, json_field: &str) -> Result<String, FilterError> {
        if self.conditions.is_empty() {
            return Ok(String::new());
        }
        PostgresJsonbTranslator::new(json_field).translate(&self.build())
    }

    /// WHERE-clause fragment for a SQLite JSON1 metadata column.
    pub fn to_sqlite_sql(&self) -> Result<String, FilterError> {
        if self.conditions.is_empty() {
            return Ok(String::new());
        }
        SqliteJsonTranslator.translate(&self.build())
    }

    /// Parameterized variant of [`to_postgres_sql`](Self::to_postgres_sql).
    pub fn to_postgres_params(&self) -> Result<SqlFragment, FilterError> {
        if self.conditions.is_empty() {
            return Ok(SqlFragment::default());
        }
        PostgresJsonbTranslator::default().translate_params(&self.build())
    }

    /// Parameterized variant of [`to_sqlite_sql`](Self::to_sqlite_sql).
    pub fn to_sqlite_params(&self) -> Result<SqlFragment, FilterError> {
        if self.conditions.is_empty() {
            return Ok(SqlFragment::default());
        }
        SqliteJsonTranslator.translate_params(&self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn build_empty_is_empty_mapping() {
        let container = ConditionContainer::new();
        assert_eq!(container.build(), json!({}));
    }

    #[test]
    fn build_single_condition_unwrapped() {
        let mut container = ConditionContainer::new();
        container.add_eq("category", "news").unwrap();
        assert_eq!(container.build(), json!({ "category": "news" }));
    }

    #[test]
    fn build_many_conditions_implicit_and() {
        let mut container = ConditionContainer::new();
        container
            .add_eq("category", "news")
            .unwrap()
            .add_gte("score", 3)
            .unwrap();
        assert_eq!(
            container.build(),
            json!({ "$and": [{ "category": "news" }, { "score": { "$gte": 3 } }] })
        );
    }

    #[test]
    fn add_methods_cover_every_variant() {
        let mut container = ConditionContainer::named("all-variants");
        container
            .add_eq("a", 1)
            .unwrap()
            .add_in("b", vec![json!(1), json!(2)])
            .unwrap()
            .add_contains("c", "x")
            .unwrap()
            .add_compare("d", "$lte", 9)
            .unwrap()
            .add_gt("e", 0)
            .unwrap()
            .add_lt("f", 10)
            .unwrap()
            .add_and(vec![])
            .add_or(vec![])
            .add_not(Condition::eq("g", 1).unwrap());
        assert_eq!(container.conditions.len(), 9);
        assert_eq!(container.name, "all-variants");
    }

    #[test]
    fn default_name_is_a_uuid() {
        let container = ConditionContainer::new();
        assert!(Uuid::parse_str(&container.name).is_ok());
    }

    #[test]
    fn postgres_sql_for_uses_custom_column() {
        let mut container = ConditionContainer::new();
        container.add_eq("k", "v").unwrap();
        assert_eq!(
            container.to_postgres_sql_for("meta").unwrap(),
            "(meta->>'k') = 'v'"
        );
    }

    #[test]
    fn empty_container_translates_to_empty_fragments() {
        let container = ConditionContainer::new();
        assert_eq!(container.to_postgres_sql().unwrap(), "");
        assert_eq!(container.to_sqlite_sql().unwrap(), "");
        assert_eq!(container.to_postgres_params().unwrap(), SqlFragment::default());
    }

    #[test]
    fn container_deserializes_with_defaults() {
        let json = r#"{"conditions":[{"type":"eq","field":"a","value":1}]}"#;
        let container: ConditionContainer = serde_json::from_str(json).unwrap();
        assert!(Uuid::parse_str(&container.name).is_ok());
        assert!(container.metadata.is_empty());
        assert_eq!(container.build(), json!({ "a": 1 }));
    }

    #[test]
    fn metadata_survives_serde_round_trip() {
        let mut container = ConditionContainer::named("tagged");
        container
            .metadata
            .insert("owner".to_string(), json!("ingest"));
        let value = serde_json::to_value(&container).unwrap();
        let back: ConditionContainer = serde_json::from_value(value).unwrap();
        assert_eq!(back.metadata.get("owner"), Some(&json!("ingest")));
    }
}
