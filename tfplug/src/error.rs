//! Error types for tfplug

/// Error type for tfplug operations
#[derive(Debug, thiserror::Error)]
pub enum TfplugError {
    #[error("Attribute not set: {0}")]
    AttributeNotFound(String),

    #[error("Type mismatch for '{attribute}': expected {expected}, got {actual}")]
    TypeMismatch {
        attribute: String,
        expected: String,
        actual: String,
    },

    #[error("Decoding error: {0}")]
    DecodingError(#[from] serde_json::Error),
}

/// Result type alias for tfplug operations
pub type Result<T> = std::result::Result<T, TfplugError>;

impl TfplugError {
    pub(crate) fn type_mismatch(attribute: &str, expected: &str, actual: &str) -> Self {
        TfplugError::TypeMismatch {
            attribute: attribute.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
