//! Filter error type
//!
//! One error enum covers the three failure surfaces of the crate:
//! condition construction, comparison-operator lookup, and mapping parsing.

use thiserror::Error;

/// Error type for condition construction, parsing, and SQL generation.
///
/// All failures are local and synchronous; nothing is transient or worth
/// retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// A condition was constructed with an invalid field.
    #[error("invalid condition: {0}")]
    Validation(String),

    /// A comparison operator outside `$gte`/`$lte`/`$gt`/`$lt`.
    #[error("unsupported comparison operator: {0}")]
    UnsupportedOperator(String),

    /// A mapping whose shape matches no recognized condition form.
    #[error("cannot parse filter: {0}")]
    Parse(String),
}

impl FilterError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
