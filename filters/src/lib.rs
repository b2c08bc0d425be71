//! # vectorsearch-filters
//!
//! Composable boolean filter conditions for vector-store metadata.
//!
//! A [`Condition`] tree renders to a MongoDB-style nested mapping via
//! [`Condition::build`]. [`ConditionContainer`] collects top-level
//! conditions, parses untyped mappings with
//! [`ConditionContainer::from_dict`], and turns filters into WHERE-clause
//! fragments for PostgreSQL JSONB and SQLite JSON1 metadata columns.
//!
//! ```
//! use serde_json::json;
//! use vectorsearch_filters::{ConditionContainer, FilterError};
//!
//! let mut filter = ConditionContainer::new();
//! filter.add_eq("category", "news")?.add_gte("score", 3)?;
//!
//! assert_eq!(
//!     filter.build(),
//!     json!({ "$and": [{ "category": "news" }, { "score": { "$gte": 3 } }] })
//! );
//! assert_eq!(
//!     filter.to_postgres_sql()?,
//!     "((cmetadata->>'category') = 'news' AND (cmetadata->>'score')::numeric >= 3)"
//! );
//! # Ok::<(), FilterError>(())
//! ```

pub mod condition;
pub mod error;
pub mod records;
pub mod sql;
pub mod utils;

pub use condition::{CompareOp, Condition, ConditionContainer};
pub use error::FilterError;
pub use sql::{
    ConditionTranslator, PostgresJsonbTranslator, SqlFragment, SqlParams, SqliteJsonTranslator,
};
