//! Error types for the PAL registries.
//!
//! Registration never fails. Queries that simply find nothing return `None`;
//! the variants below cover the operations whose callers need to know why.

use crate::config::RegistryConfig;
use thiserror::Error;

/// Main error type for the PAL crates.
#[derive(Debug, Error)]
pub enum PalError {
    #[error("No log level registered for {identifier}")]
    LevelNotFound { identifier: String },

    #[error("Library table index {index} out of range (size {size})")]
    EntryOutOfRange { index: usize, size: usize },

    #[error("Invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

/// Result type alias for PAL operations.
pub type Result<T> = std::result::Result<T, PalError>;

impl From<std::io::Error> for PalError {
    fn from(err: std::io::Error) -> Self {
        PalError::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl PalError {
    /// Create an invalid-argument error.
    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        PalError::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Convert to the status code returned across the C ABI.
    ///
    /// The C interface only distinguishes success (`0`) from failure (`-1`),
    /// so every variant maps to the same sentinel.
    pub fn to_status_code(&self) -> i32 {
        match self {
            PalError::LevelNotFound { .. }
            | PalError::EntryOutOfRange { .. }
            | PalError::InvalidArgument { .. }
            | PalError::Io { .. } => RegistryConfig::STATUS_ERROR,
        }
    }

    /// Check whether this error only reports a missing entry.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PalError::LevelNotFound { .. } | PalError::EntryOutOfRange { .. }
        )
    }
}
