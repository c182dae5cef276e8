//! Error types for the application

use thiserror::Error;

/// Result type alias using our ExecutorError
pub type Result<T> = std::result::Result<T, ExecutorError>;

/// Main error type for executor operations
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// File and stream errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Audit log encoding errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Broker refused the order
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Channel send errors
    #[error("Channel send error: {0}")]
    ChannelSend(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<url::ParseError> for ExecutorError {
    fn from(err: url::ParseError) -> Self {
        ExecutorError::Configuration(format!("invalid URL: {}", err))
    }
}
