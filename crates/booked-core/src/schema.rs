//! Deriving the detail table schema.

use std::collections::BTreeSet;

use booked_models::ReportSchema;

use crate::aggregate::Aggregates;
use crate::ordering::compare_column_names;

/// Builds the schema from the union of all assignee keys.
///
/// The result depends only on the set of keys, so it is the same for any
/// ordering of the input records.
pub fn build_schema(aggregates: &Aggregates) -> ReportSchema {
    let keys: BTreeSet<&str> = aggregates
        .values()
        .flat_map(|a| a.hours_by_assignee.keys())
        .map(String::as_str)
        .collect();

    let mut assignees: Vec<String> = keys.into_iter().map(str::to_string).collect();
    assignees.sort_by(|a, b| compare_column_names(a, b));

    ReportSchema::new(assignees)
}
