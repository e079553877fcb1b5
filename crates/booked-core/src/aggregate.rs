//! Folding task records into per-project aggregates.

use std::collections::HashMap;

use booked_models::{ProjectHoursAggregate, TaskRecord};
use tracing::debug;

use crate::error::{ReportError, Result};
use crate::sum::stable_sum;

/// Aggregates keyed by project id.
pub type Aggregates = HashMap<String, ProjectHoursAggregate>;

/// Groups records by project and sums hours per assignee key.
///
/// Each cell is summed with [`stable_sum`], so the result does not depend on
/// the order records arrive in.
///
/// The project name is taken from the first record of a project that carries
/// a non-empty name; later names for the same project are ignored.
///
/// # Errors
/// Returns [`ReportError::NoData`] if `records` is empty.
pub fn aggregate_records<'a, I>(records: I) -> Result<Aggregates>
where
    I: IntoIterator<Item = &'a TaskRecord>,
{
    let mut aggregates: Aggregates = HashMap::new();
    let mut parts: HashMap<(String, String), Vec<f64>> = HashMap::new();
    let mut seen = 0usize;

    for record in records {
        seen += 1;

        let aggregate = aggregates
            .entry(record.project_id.clone())
            .or_insert_with(|| ProjectHoursAggregate::new(record.project_id.clone()));

        if aggregate.project_name.is_empty() {
            if let Some(name) = record.project_name.as_deref().filter(|n| !n.is_empty()) {
                aggregate.project_name = name.to_string();
            }
        }

        parts
            .entry((record.project_id.clone(), record.assignee_key().to_string()))
            .or_default()
            .push(record.hours);
    }

    if seen == 0 {
        return Err(ReportError::NoData);
    }

    for ((project_id, key), hours) in parts {
        if let Some(aggregate) = aggregates.get_mut(&project_id) {
            aggregate.hours_by_assignee.insert(key, stable_sum(hours));
        }
    }

    debug!(
        records = seen,
        projects = aggregates.len(),
        "aggregated task records"
    );

    Ok(aggregates)
}
