use thiserror::Error;

/// Main error type for the idea board engine
#[derive(Error, Debug)]
pub enum IdeaBoardError {
    /// A `createdAt` value that cannot be turned into an instant
    #[error("Invalid timestamp for idea '{id}': {value}")]
    InvalidTimestamp { id: String, value: String },

    /// Record is missing a field the engine cannot default
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    /// Rejected submission
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Unknown idea id
    #[error("Idea not found: {0}")]
    NotFound(String),

    /// Caller does not own the idea it tried to change
    #[error("User '{user_id}' does not own idea '{idea_id}'")]
    Forbidden { idea_id: String, user_id: String },

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<String> for IdeaBoardError {
    fn from(s: String) -> Self {
        IdeaBoardError::Other(s)
    }
}

impl From<&str> for IdeaBoardError {
    fn from(s: &str) -> Self {
        IdeaBoardError::Other(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, IdeaBoardError>;
