//! Error types for the project advisor.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Recommendation client error: {0}")]
    Client(#[from] ClientError),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Failures of a single exchange with the recommendation API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request to recommendation API failed: {reason}")]
    Transport { reason: String },

    #[error("Recommendation API returned HTTP {status}")]
    Status { status: u16, message: Option<String> },

    #[error("Unexpected response from recommendation API: {reason}")]
    Protocol { reason: String },
}

impl ClientError {
    /// Error text supplied by the API itself, if it sent one.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Rejected or failed wizard operations.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("A request is already in flight")]
    Busy,

    #[error("Cannot {operation} while {status}")]
    InvalidState {
        operation: &'static str,
        status: String,
    },

    #[error("Session was reset while the request was in flight")]
    Stale,

    #[error("Fetch failed: {0}")]
    Fetch(#[from] ClientError),
}

/// Result type alias for the advisor.
pub type Result<T> = std::result::Result<T, Error>;
