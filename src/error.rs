//! Error types for widget-bridge.
//!
//! [`BridgeError`] is fatal for a whole conversion call. [`ConvertError`] is
//! raised by a single converter and recovered per node by the transformer.

use thiserror::Error;

use crate::transform::ValidateError;

/// Errors that abort a conversion call.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Malformed top-level input (missing payload, bad envelope)
    #[error("structural error: {0}")]
    Structural(String),

    /// The sanitizer rejected the converted tree
    #[error("sanitizer rejected the converted tree")]
    SanitizationRejected,

    /// The converted tree violates the native schema
    #[error("validation failed: {0}")]
    Validation(#[from] ValidateError),

    /// A registry pattern could not be compiled
    #[error("invalid registry pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The pattern as written
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// Serialization/deserialization failed
    #[error("serialization error: {0}")]
    Serialize(String),
}

/// Result type alias for conversion calls.
pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    /// Create a structural error with a message.
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }

    /// Create a serialization error from any error type.
    pub fn serialize(err: impl std::error::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialize(err)
    }
}

/// Per-node failure raised by a converter.
///
/// Recovered by the transformer: logged, then the node continues down the
/// fallback ladder.
#[derive(Debug, Clone, Error)]
#[error("{converter}: {message}")]
pub struct ConvertError {
    /// Name of the converter that failed
    pub converter: String,
    /// The error message
    pub message: String,
}

impl ConvertError {
    /// Create a new converter error.
    pub fn new(converter: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            converter: converter.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BridgeError::structural("missing payload");
        assert_eq!(err.to_string(), "structural error: missing payload");

        let err = BridgeError::SanitizationRejected;
        assert_eq!(err.to_string(), "sanitizer rejected the converted tree");

        let err = ConvertError::new("gallery", "no images");
        assert_eq!(err.to_string(), "gallery: no images");
    }

    #[test]
    fn test_validation_error_converts() {
        let err: BridgeError = ValidateError::new("id", "bad id").into();
        assert!(matches!(err, BridgeError::Validation(_)));
        assert!(err.to_string().starts_with("validation failed: id: bad id"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BridgeError>();
        assert_send_sync::<ConvertError>();
    }
}
