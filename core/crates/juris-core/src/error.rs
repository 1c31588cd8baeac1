//! Error types for the temporal deontic logic engine

use thiserror::Error;

/// Main error type for engine operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JurisError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("External service unavailable: {service}: {message}")]
    ExternalUnavailable { service: String, message: String },

    #[error("Operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Extraction error: {message}")]
    ExtractionError { message: String },

    #[error("Theorem corpus is empty")]
    CorpusEmpty,

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Serialization error: {message}")]
    SerializationError { message: String },
}

impl JurisError {
    /// Create an invalid-input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an extraction error
    pub fn extraction_error(message: impl Into<String>) -> Self {
        Self::ExtractionError {
            message: message.into(),
        }
    }

    /// Create an external-unavailable error for a named service
    pub fn external_unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors are converted to logged events and structured
    /// result fields; only unrecoverable ones escape single-call APIs.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidInput { .. } => false,
            Self::DimensionMismatch { .. } => false,
            Self::ExternalUnavailable { .. } => true,
            Self::Timeout { .. } => true,
            Self::ExtractionError { .. } => true,
            Self::CorpusEmpty => true,
            Self::IoError { .. } => false,
            Self::SerializationError { .. } => false,
        }
    }
}

impl From<std::io::Error> for JurisError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for JurisError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            message: err.to_string(),
        }
    }
}

/// Result type for engine operations
pub type JurisResult<T> = Result<T, JurisError>;
