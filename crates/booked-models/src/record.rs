//! Task records and per-project aggregates.
//!
//! A [`TaskRecord`] is one row read from the upstream task collection. The
//! engine folds records into one [`ProjectHoursAggregate`] per project id.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Assignee key used for records without an assignee.
pub const UNASSIGNED_KEY: &str = "<unassigned>";

/// A single time-tracking record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Opaque project identifier; may look numeric.
    pub project_id: String,

    /// Display name of the project, if the record carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    /// Assignee identifier (usually an email). `None` means unassigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    /// Hours booked on the task.
    pub hours: f64,
}

impl TaskRecord {
    /// Creates an unassigned record without a project name.
    pub fn new(project_id: impl Into<String>, hours: f64) -> Self {
        Self {
            project_id: project_id.into(),
            project_name: None,
            assignee: None,
            hours,
        }
    }

    /// Sets the assignee identifier.
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Sets the project display name.
    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// Returns the key this record's hours are accumulated under.
    ///
    /// The identifier is used verbatim; a missing one maps to
    /// [`UNASSIGNED_KEY`].
    pub fn assignee_key(&self) -> &str {
        self.assignee.as_deref().unwrap_or(UNASSIGNED_KEY)
    }
}

/// Summed hours for one project, keyed by assignee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectHoursAggregate {
    /// Project identifier shared by all folded records.
    pub project_id: String,

    /// First non-empty project name seen, or empty.
    pub project_name: String,

    /// Assignee key to summed hours.
    pub hours_by_assignee: HashMap<String, f64>,
}

impl ProjectHoursAggregate {
    /// Creates an empty aggregate for a project.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            project_name: String::new(),
            hours_by_assignee: HashMap::new(),
        }
    }

    /// Hours recorded for an assignee key, zero when absent.
    pub fn hours_for(&self, key: &str) -> f64 {
        self.hours_by_assignee.get(key).copied().unwrap_or(0.0)
    }
}
