use thiserror::Error;

/// Top-level error type for the Signpost system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define their
/// own error types and implement `From<SubsystemError> for SignpostError` so
/// that the `?` operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SignpostError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Conversation load error: {0}")]
    Load(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Feedback forwarding error: {0}")]
    Forwarding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for SignpostError {
    fn from(err: toml::de::Error) -> Self {
        SignpostError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SignpostError {
    fn from(err: toml::ser::Error) -> Self {
        SignpostError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SignpostError {
    fn from(err: serde_json::Error) -> Self {
        SignpostError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Signpost operations.
pub type Result<T> = std::result::Result<T, SignpostError>;
