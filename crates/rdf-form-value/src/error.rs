//! Error types for value decoding
//!
//! Store mutations never fail; only decoding external JSON-LD into
//! [`ValueNode`](crate::ValueNode)s can.

/// Errors while decoding a wire value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// Value is neither a string nor a JSON-LD value object
    #[error("unsupported value shape: {0}")]
    UnsupportedShape(String),

    /// Object carries neither `@value` nor `@id`
    #[error("value object has neither @value nor @id: {0}")]
    MissingKey(String),

    /// A keyword holds a non-string payload where a string is required
    #[error("{key} must be a string, got {found}")]
    InvalidKeyword {
        /// The offending keyword (`@id`, `@language`)
        key: &'static str,
        /// Rendering of the actual payload
        found: String,
    },
}

impl ValueError {
    /// Create invalid keyword error
    pub fn invalid_keyword(key: &'static str, found: &serde_json::Value) -> Self {
        Self::InvalidKeyword {
            key,
            found: found.to_string(),
        }
    }
}
