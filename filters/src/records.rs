//! Plain data records exchanged with the document CRUD layer
//!
//! These carry no filtering logic; they are validated value objects the
//! surrounding ingestion and CRUD services move around. Chunking and
//! embedding happen outside this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use validator::Validate;

/// A document category.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryData {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub metadata: Map<String, JsonValue>,
}

/// A directed edge between two source documents.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RelationData {
    #[validate(length(min = 1, message = "from_node must not be empty"))]
    pub from_node: String,
    #[validate(length(min = 1, message = "to_node must not be empty"))]
    pub to_node: String,
    #[validate(length(min = 1, message = "edge_type must not be empty"))]
    pub edge_type: String,
    #[serde(default)]
    pub metadata: Map<String, JsonValue>,
}

impl RelationData {
    /// True when every identifier field is non-empty.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// A free-form document tag.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TagData {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub metadata: Map<String, JsonValue>,
}

/// One source document row, as stored and retrieved by the CRUD layer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SourceDocumentData {
    #[validate(length(min = 1, message = "source_id must not be empty"))]
    pub source_id: String,
    pub source_content: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Map<String, JsonValue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn relation_is_valid_requires_all_identifiers() {
        let relation = RelationData {
            from_node: "a".to_string(),
            to_node: "b".to_string(),
            edge_type: "cites".to_string(),
            metadata: Map::new(),
        };
        assert!(relation.is_valid());

        let broken = RelationData {
            edge_type: String::new(),
            ..relation
        };
        assert!(!broken.is_valid());
    }

    #[test]
    fn category_rejects_empty_name() {
        let category = CategoryData {
            name: String::new(),
            description: "news articles".to_string(),
            metadata: Map::new(),
        };
        assert!(category.validate().is_err());
    }

    #[test]
    fn source_document_deserializes_with_defaults() {
        let json = r#"{"source_id":"doc-1","source_content":"body"}"#;
        let doc: SourceDocumentData = serde_json::from_str(json).unwrap();
        assert_eq!(doc.source_id, "doc-1");
        assert_eq!(doc.category, "");
        assert!(doc.metadata.is_empty());
        assert!(doc.updated_at <= Utc::now());
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn source_document_round_trips_metadata() {
        let mut doc = SourceDocumentData {
            source_id: "doc-2".to_string(),
            source_content: "body".to_string(),
            category: "news".to_string(),
            updated_at: Utc::now(),
            metadata: Map::new(),
        };
        doc.metadata.insert("lang".to_string(), json!("en"));

        let value = serde_json::to_value(&doc).unwrap();
        let back: SourceDocumentData = serde_json::from_value(value).unwrap();
        assert_eq!(back.metadata.get("lang"), Some(&json!("en")));
        assert_eq!(back.updated_at, doc.updated_at);
    }

    #[test]
    fn tag_validates_like_category() {
        let tag = TagData {
            name: "breaking".to_string(),
            description: String::new(),
            metadata: Map::new(),
        };
        assert!(tag.validate().is_ok());
    }
}
