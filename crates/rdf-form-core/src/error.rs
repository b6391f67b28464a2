//! Error types for the form controller and CLI
//!
//! Mutations never fail; these cover loading inputs and wiring services.

use rdf_form_enrich::{ConfigError, LookupError};

/// Form-level error
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// No widget registered under this type
    #[error("unknown widget type: {0}")]
    UnknownWidget(String),

    /// Record is not a JSON object
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// JSON input could not be decoded
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration failed to load
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A lookup service could not be built
    #[error("lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// Input file could not be read
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FormError {
    /// Whether the error came from user-supplied input rather than the environment
    #[inline]
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownWidget(_) | Self::InvalidRecord(_) | Self::Json(_) | Self::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FormError::UnknownWidget("slider".to_string());
        assert_eq!(err.to_string(), "unknown widget type: slider");
        assert!(err.is_input_error());
    }

    #[test]
    fn io_is_not_input_error() {
        let err = FormError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(!err.is_input_error());
    }
}
