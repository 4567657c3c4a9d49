use thiserror::Error;

/// Main error type for querybridge operations
#[derive(Error, Debug)]
pub enum QueryBridgeError {
    #[error("Unsupported query shape: {0}")]
    UnsupportedQueryShape(String),

    #[error("Unsupported logic shape: {0}")]
    UnsupportedLogicShape(String),

    #[error("Malformed filter envelope: {0}")]
    MalformedFilterEnvelope(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type alias for querybridge operations
pub type Result<T> = std::result::Result<T, QueryBridgeError>;

impl QueryBridgeError {
    /// Check if this error represents a state callers treat as "no prior
    /// filter" rather than a failed translation
    pub fn is_recoverable(&self) -> bool {
        matches!(self, QueryBridgeError::MalformedFilterEnvelope(_))
    }
}
