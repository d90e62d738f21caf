//! Error types for topology compilation

use thiserror::Error;

/// Main error type for flotilla operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Region has no entry in the machine image table
    #[error("unsupported region: {0}")]
    UnsupportedRegion(String),

    /// Validation error for input declarations
    #[error("validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create an unsupported-region error carrying the region's display string
    pub fn unsupported_region(region: impl std::fmt::Display) -> Self {
        Self::UnsupportedRegion(region.to_string())
    }

    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}
