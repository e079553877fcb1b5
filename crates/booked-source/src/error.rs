//! Error types for task sources.

use thiserror::Error;

/// Errors that can occur while reading task records.
#[derive(Error, Debug)]
pub enum SourceError {
    /// A single connection attempt failed.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The source stayed unreachable after all attempts.
    #[error("source unreachable after {attempts} attempt(s): {message}")]
    Connectivity {
        /// Number of attempts made.
        attempts: u32,
        /// Error from the last attempt.
        message: String,
    },

    /// The bulk read failed after connecting.
    #[error("query failed: {0}")]
    Query(String),

    /// Invalid source configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Failed to decode records.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;
