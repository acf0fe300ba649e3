//! Error types for generation client operations
//!
//! Every variant is an external-service failure from the caller's point of
//! view; the variants only keep the upstream detail apart for logging.

use std::time::Duration;
use thiserror::Error;

/// Main error type for calls to the text-generation endpoint
#[derive(Debug, Error)]
pub enum LLMError {
    /// Credential or endpoint unusable before any request was made
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Request timed out
    #[error("Request timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Network error occurred
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// API returned a non-success status
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Parsing error: {message}")]
    ParseError { message: String },

    /// Response decoded but carried no candidate text
    #[error("Empty response: {message}")]
    EmptyResponse { message: String },
}

impl LLMError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigurationError { message: message.into() }
    }

    /// Create a timeout error
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout { duration }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError { message: message.into() }
    }

    /// Create an API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError { status, message: message.into() }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError { message: message.into() }
    }

    /// Create an empty-response error
    pub fn empty(message: impl Into<String>) -> Self {
        Self::EmptyResponse { message: message.into() }
    }
}

/// Result type for generation client operations
pub type LLMResult<T> = Result<T, LLMError>;

/// Convert from JSON errors
impl From<serde_json::Error> for LLMError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError { message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LLMError::api(503, "backend unavailable");
        assert_eq!(err.to_string(), "API error (status 503): backend unavailable");

        let err = LLMError::timeout(Duration::from_secs(30));
        assert!(err.to_string().contains("timed out"));

        let err = LLMError::empty("no candidates");
        assert_eq!(err.to_string(), "Empty response: no candidates");
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let llm_err: LLMError = json_err.into();
        assert!(matches!(llm_err, LLMError::ParseError { .. }));
    }
}
