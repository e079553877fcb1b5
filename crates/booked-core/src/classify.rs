//! Bucketing assignees into internal, external and unassigned hours.

use booked_models::{Bucket, Cell, DetailRow, ReportSchema, SummaryRow};

use crate::sum::stable_sum;

/// Spellings of "no assignee" recognized in column names.
///
/// Older exports used `no assignee>` as the placeholder; current records use
/// [`booked_models::UNASSIGNED_KEY`].
pub const NO_ASSIGNEE_SPELLINGS: [&str; 4] =
    ["no assignee", "no assignee>", "<unassigned>", "<unassigned"];

/// Classification rule for assignee keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationPolicy {
    internal_suffixes: Vec<String>,
}

impl ClassificationPolicy {
    /// Creates a policy from internal domain suffixes (e.g. `@example.com`).
    ///
    /// Suffixes are trimmed and lowercased; blank entries are dropped.
    pub fn new<I, S>(internal_suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let internal_suffixes = internal_suffixes
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { internal_suffixes }
    }

    /// Internal suffixes in effect.
    pub fn internal_suffixes(&self) -> &[String] {
        &self.internal_suffixes
    }

    /// Classifies a single assignee key.
    pub fn classify(&self, key: &str) -> Bucket {
        let key = key.trim().to_lowercase();

        if key.is_empty()
            || NO_ASSIGNEE_SPELLINGS
                .iter()
                .any(|spelling| key.contains(spelling))
        {
            return Bucket::Unassigned;
        }

        if self
            .internal_suffixes
            .iter()
            .any(|suffix| key.ends_with(suffix.as_str()))
        {
            return Bucket::Internal;
        }

        Bucket::External
    }

    /// Derives summary rows, keeping the order of `rows`.
    ///
    /// Hour cells go through [`Cell::as_number`], so non-numeric values count
    /// as zero. `total_hours` is the sum of every hour cell of the row.
    pub fn summarize(&self, rows: &[DetailRow], schema: &ReportSchema) -> Vec<SummaryRow> {
        let buckets: Vec<Bucket> = schema
            .assignees()
            .iter()
            .map(|key| self.classify(key))
            .collect();

        rows.iter()
            .map(|row| {
                let hours: Vec<f64> = row
                    .to_cells()
                    .iter()
                    .skip(2)
                    .map(Cell::as_number)
                    .collect();
                let bucket_sum = |wanted: Bucket| {
                    stable_sum(
                        buckets
                            .iter()
                            .zip(&hours)
                            .filter(|(bucket, _)| **bucket == wanted)
                            .map(|(_, hours)| *hours),
                    )
                };

                SummaryRow {
                    project_id: row.project_id.clone(),
                    project_cell: row.project_cell.clone(),
                    project_name: row.project_name.clone(),
                    name_cell: row.name_cell.clone(),
                    internal: bucket_sum(Bucket::Internal),
                    external: bucket_sum(Bucket::External),
                    unassigned: bucket_sum(Bucket::Unassigned),
                    total_hours: stable_sum(hours.iter().copied()),
                }
            })
            .collect()
    }
}
