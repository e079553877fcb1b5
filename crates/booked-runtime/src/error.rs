//! Error types for the runtime crate.

use thiserror::Error;

use booked_core::ReportError;
use booked_sheets::{RemoteWriteError, StoreError};
use booked_source::SourceError;

use crate::config::ConfigError;

/// Errors that can occur in the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Reading task records failed.
    #[error("task source error: {0}")]
    Source(#[from] SourceError),

    /// The report could not be computed.
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// A store could not be set up.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// One or both sheet writes failed.
    #[error("{}", describe_write_failures(.0))]
    Write(Vec<RemoteWriteError>),

    /// The schedule expression is not valid cron.
    #[error("invalid schedule {expression:?}: {reason}")]
    InvalidSchedule {
        /// Expression as configured.
        expression: String,
        /// Parser message.
        reason: String,
    },

    /// A run was triggered while another is still in flight.
    #[error("a report run is already in progress")]
    AlreadyRunning,

    /// Runtime not started.
    #[error("runtime not started")]
    NotStarted,

    /// Runtime already started.
    #[error("runtime already started")]
    AlreadyStarted,

    /// Shutdown error.
    #[error("shutdown error: {0}")]
    Shutdown(String),
}

fn describe_write_failures(failures: &[RemoteWriteError]) -> String {
    let details: Vec<String> = failures.iter().map(ToString::to_string).collect();
    format!("sheet write failed: {}", details.join("; "))
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
