//! Error types for the agent crate.

use thiserror::Error;

/// Errors that can occur in agent and team operations.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Model invocation failed.
    #[error("model invocation failed: {0}")]
    ModelInvocation(String),

    /// Response parsing failed.
    #[error("failed to parse response: {0}")]
    ResponseParse(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Human input stream ended.
    #[error("input closed while waiting for {0}")]
    InputClosed(String),

    /// Reading human input failed.
    #[error("failed to read input: {0}")]
    Input(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgentError::ModelInvocation("HTTP 503".into());
        assert_eq!(err.to_string(), "model invocation failed: HTTP 503");

        let err = AgentError::InputClosed("user_proxy".into());
        assert_eq!(err.to_string(), "input closed while waiting for user_proxy");
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: AgentError = json_err.into();
        assert!(matches!(err, AgentError::Serialization(_)));
    }
}
