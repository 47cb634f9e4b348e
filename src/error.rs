//! Centralized error types for spamlens.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the spamlens library.
#[derive(Error, Debug)]
pub enum SpamError {
    /// The raw text could not be turned into a message structure.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// The raw message exceeds the configured size limit.
    #[error("Message is {size} bytes, larger than the {limit} byte limit")]
    MessageTooLarge { size: usize, limit: usize },

    /// The model or the vectorizer is not loaded.
    #[error("Model unavailable: {0}")]
    UnavailableModel(String),

    /// An artifact file could not be decoded or is internally inconsistent.
    #[error("Invalid artifact '{path}': {reason}")]
    InvalidArtifact { path: PathBuf, reason: String },

    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Any other failure while vectorizing or running inference.
    #[error("Processing failed: {0}")]
    Processing(String),
}

/// Convenience alias for `Result<T, SpamError>`.
pub type Result<T> = std::result::Result<T, SpamError>;

/// How a boundary layer should report an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller sent bad input; retrying the same input will not help.
    ClientInput,
    /// The service cannot answer right now (missing model artifacts).
    Unavailable,
    /// Anything else.
    Internal,
}

impl SpamError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an `InvalidArtifact` variant.
    pub fn invalid_artifact(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidArtifact {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Classify the error for the boundary.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MalformedMessage(_) | Self::MessageTooLarge { .. } => ErrorClass::ClientInput,
            Self::UnavailableModel(_) => ErrorClass::Unavailable,
            Self::InvalidArtifact { .. } | Self::Io { .. } | Self::Processing(_) => {
                ErrorClass::Internal
            }
        }
    }
}
