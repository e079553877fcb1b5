//! Error types for tabular store operations.

use std::fmt;

use thiserror::Error;

/// Errors returned by a [`crate::TabularStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// Obtaining an access token failed.
    #[error("authentication error: {0}")]
    Auth(String),

    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The response could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The named resource does not exist and may not be created.
    #[error("sheet not found: {0}")]
    ResourceMissing(String),

    /// A write does not fit the sheet's current grid.
    #[error("sheet {title} has {columns} columns, write needs {needed}")]
    GridLimit {
        /// Sheet title.
        title: String,
        /// Current column capacity.
        columns: usize,
        /// Columns the write needs.
        needed: usize,
    },

    /// The store is temporarily unavailable.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Invalid store configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Protocol step at which a reconciliation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStep {
    /// Looking up the sheet.
    Lookup,
    /// Creating a missing sheet.
    Create,
    /// Growing the column count.
    Resize,
    /// Clearing old contents.
    Clear,
    /// Writing the header row.
    Header,
    /// Appending a row batch (zero-based index).
    Append {
        /// Index of the failed batch.
        batch: usize,
    },
}

impl fmt::Display for WriteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteStep::Lookup => write!(f, "lookup"),
            WriteStep::Create => write!(f, "create"),
            WriteStep::Resize => write!(f, "resize"),
            WriteStep::Clear => write!(f, "clear"),
            WriteStep::Header => write!(f, "header"),
            WriteStep::Append { batch } => write!(f, "append batch {batch}"),
        }
    }
}

/// A reconciliation of one sheet failed.
///
/// Steps after `step` were not attempted. The sheet may be left cleared or
/// with only part of its rows until the next successful run.
#[derive(Error, Debug)]
#[error("writing sheet {resource} failed at {step}: {source}")]
pub struct RemoteWriteError {
    /// Sheet title.
    pub resource: String,
    /// Step that failed.
    pub step: WriteStep,
    /// Underlying store error.
    #[source]
    pub source: StoreError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_write_error_message() {
        let err = RemoteWriteError {
            resource: "Summary".to_string(),
            step: WriteStep::Append { batch: 2 },
            source: StoreError::Api {
                status: 429,
                message: "quota exceeded".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "writing sheet Summary failed at append batch 2: API error (429): quota exceeded"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
