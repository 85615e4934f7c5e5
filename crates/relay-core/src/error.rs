//! Unified error types for relay

use thiserror::Error;

/// Unified error type for all relay operations
#[derive(Error, Debug)]
pub enum RelayError {
    // Pre-flight errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Stage errors
    #[error("Asset pool too small: need {needed}, have {available}")]
    InsufficientPool { needed: usize, available: usize },

    #[error("Generated response is missing the title/body separator: {0}")]
    ResponseFormat(String),

    #[error("Generated response content rejected: {0}")]
    ResponseContent(String),

    #[error("Publish failed at {step}: {message}")]
    Publish { step: String, message: String },

    // Storage errors
    #[error("Storage error at {path}: {message}")]
    Storage { path: String, message: String },

    // Adapter errors
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("Source error: {0}")]
    Source(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RelayError {
    /// Build a storage error for the given path
    pub fn storage(path: impl AsRef<std::path::Path>, message: impl Into<String>) -> Self {
        Self::Storage {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Build a publish error for the named step
    pub fn publish(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Publish {
            step: step.into(),
            message: message.into(),
        }
    }
}

/// Result type alias using RelayError
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = RelayError::InsufficientPool {
            needed: 2,
            available: 1,
        };
        assert_eq!(err.to_string(), "Asset pool too small: need 2, have 1");

        let err = RelayError::storage("data/crawled_urls.json", "expected array");
        assert!(err.to_string().contains("data/crawled_urls.json"));

        let err = RelayError::publish("compose", "title field missing");
        assert_eq!(err.to_string(), "Publish failed at compose: title field missing");
    }
}
