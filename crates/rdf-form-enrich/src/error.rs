//! Error types for enrichment
//!
//! Provides error handling for:
//! - Query execution and graph traversal (lookup failures)
//! - Configuration loading
//!
//! Lookup failures never reach the widget layer: the cache and the
//! suggestion engine log them and fall back to "no value".

/// Errors from the external lookup services
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Query execution service failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Traversal of an entity path failed
    #[error("traversal of {subject} failed: {message}")]
    TraversalFailed { subject: String, message: String },

    /// HTTP transport error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be parsed
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid endpoint or proxy URL
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl LookupError {
    /// Create traversal error for subject
    pub fn traversal(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TraversalFailed {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl From<quick_xml::Error> for LookupError {
    fn from(err: quick_xml::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

/// Errors while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML syntax or schema error
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Semantically invalid value
    #[error("invalid configuration value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_error_display() {
        let err = LookupError::traversal("urn:a", "timeout");
        assert_eq!(err.to_string(), "traversal of urn:a failed: timeout");
    }

    #[test]
    fn invalid_value_display() {
        let err = ConfigError::InvalidValue {
            key: "min_search_len",
            message: "must be positive".to_string(),
        };
        assert!(err.to_string().contains("min_search_len"));
    }
}
