//! Error types for atlas-mcp operations

/// Result type for atlas-mcp operations
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Error types for the atlas-mcp server
#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Session registry error
    #[error("Session error: {0}")]
    Session(String),

    /// Tool argument validation failed
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Remote Atlassian API returned a non-success status
    #[error("{service} API error (HTTP {status}): {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for AtlasError {
    fn from(s: String) -> Self {
        AtlasError::Other(s)
    }
}

impl From<&str> for AtlasError {
    fn from(s: &str) -> Self {
        AtlasError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for AtlasError {
    fn from(err: anyhow::Error) -> Self {
        AtlasError::Other(err.to_string())
    }
}
