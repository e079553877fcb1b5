//! Error types for report computation.

use thiserror::Error;

/// Errors that can occur while building a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The record set was empty; nothing to report.
    #[error("no task records found")]
    NoData,

    /// A row could not be rendered against the computed schema.
    ///
    /// Unreachable by construction; seeing it means a defect in the engine.
    #[error("schema inconsistency: {0}")]
    SchemaInconsistency(String),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
