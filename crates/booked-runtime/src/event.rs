//! Run events.

use chrono::{DateTime, Utc};

use crate::job::RunSummary;

/// Events emitted by the report job.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// A run began.
    Started {
        /// Run number, starting at 1.
        run_id: u64,
        /// Start time.
        at: DateTime<Utc>,
        /// Whether the run writes to the dry-run sink.
        dry_run: bool,
    },
    /// A run finished and both sheets were written.
    Succeeded {
        /// Run number.
        run_id: u64,
        /// What the run did.
        summary: RunSummary,
    },
    /// A run failed.
    Failed {
        /// Run number.
        run_id: u64,
        /// Error message.
        error: String,
    },
    /// A trigger was ignored because a run was in flight.
    Skipped {
        /// Time of the ignored trigger.
        at: DateTime<Utc>,
    },
}

impl RunEvent {
    /// Returns the run number, if the event belongs to a run.
    pub fn run_id(&self) -> Option<u64> {
        match self {
            RunEvent::Started { run_id, .. }
            | RunEvent::Succeeded { run_id, .. }
            | RunEvent::Failed { run_id, .. } => Some(*run_id),
            RunEvent::Skipped { .. } => None,
        }
    }

    /// Returns true if this is a failure event.
    pub fn is_error(&self) -> bool {
        matches!(self, RunEvent::Failed { .. })
    }
}
