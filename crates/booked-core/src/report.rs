//! End-to-end report computation.

use booked_models::{DetailRow, ReportSchema, SummaryRow, Table, TaskRecord};
use tracing::debug;

use crate::aggregate::aggregate_records;
use crate::classify::ClassificationPolicy;
use crate::error::{ReportError, Result};
use crate::normalize::normalize_rows;
use crate::schema::build_schema;

/// Detail and summary tables computed from one record set.
///
/// `summary[i]` always describes the same project as `detail[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Detail table schema.
    pub schema: ReportSchema,
    /// Detail rows in canonical order.
    pub detail: Vec<DetailRow>,
    /// Summary rows aligned with `detail`.
    pub summary: Vec<SummaryRow>,
}

impl Report {
    /// Renders the detail table.
    ///
    /// # Errors
    /// Returns [`ReportError::SchemaInconsistency`] if a row is not as wide as
    /// the header.
    pub fn detail_table(&self) -> Result<Table> {
        let header = self.schema.header();
        let mut rows = Vec::with_capacity(self.detail.len());

        for row in &self.detail {
            let cells = row.to_cells();
            if cells.len() != header.len() {
                return Err(ReportError::SchemaInconsistency(format!(
                    "row for project {} has {} cells, header has {}",
                    row.project_id,
                    cells.len(),
                    header.len()
                )));
            }
            rows.push(cells);
        }

        Ok(Table::new(header, rows))
    }

    /// Renders the summary table.
    pub fn summary_table(&self) -> Table {
        SummaryRow::table(&self.summary)
    }
}

/// Computes the full report for a record set.
///
/// # Errors
/// Returns [`ReportError::NoData`] for an empty record set.
pub fn build_report(records: &[TaskRecord], policy: &ClassificationPolicy) -> Result<Report> {
    let aggregates = aggregate_records(records)?;
    let schema = build_schema(&aggregates);
    let detail = normalize_rows(&aggregates, &schema)?;
    let summary = policy.summarize(&detail, &schema);

    debug!(
        projects = detail.len(),
        columns = schema.width(),
        "report computed"
    );

    Ok(Report {
        schema,
        detail,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sum::stable_sum;
    use booked_models::{Cell, UNASSIGNED_KEY};

    fn example_records() -> Vec<TaskRecord> {
        vec![
            TaskRecord::new("1", 3.0).with_assignee("x@int.example"),
            TaskRecord::new("1", 2.0),
            TaskRecord::new("2", 5.0).with_assignee("y@ext.example"),
        ]
    }

    #[test]
    fn test_worked_example() {
        let policy = ClassificationPolicy::new(["@int.example"]);
        let report = build_report(&example_records(), &policy).unwrap();

        let ids: Vec<&str> = report.detail.iter().map(|r| r.project_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);

        let schema = &report.schema;
        let p1 = &report.detail[0];
        assert_eq!(p1.hours_for(schema, "x@int.example"), Some(3.0));
        assert_eq!(p1.hours_for(schema, UNASSIGNED_KEY), Some(2.0));
        let p2 = &report.detail[1];
        assert_eq!(p2.hours_for(schema, "y@ext.example"), Some(5.0));

        let s1 = &report.summary[0];
        assert_eq!(
            (s1.internal, s1.unassigned, s1.external, s1.total_hours),
            (3.0, 2.0, 0.0, 5.0)
        );
        let s2 = &report.summary[1];
        assert_eq!(
            (s2.internal, s2.unassigned, s2.external, s2.total_hours),
            (0.0, 0.0, 5.0, 5.0)
        );
    }

    #[test]
    fn test_empty_records_fail() {
        let result = build_report(&[], &ClassificationPolicy::default());
        assert!(matches!(result, Err(ReportError::NoData)));
    }

    #[test]
    fn test_summary_aligned_with_detail() {
        let records: Vec<TaskRecord> = ["900", "7", "abc", "12345678901234567890123", "40"]
            .iter()
            .enumerate()
            .map(|(i, id)| TaskRecord::new(*id, i as f64 + 0.5).with_assignee("a@x.io"))
            .collect();
        let report = build_report(&records, &ClassificationPolicy::default()).unwrap();

        assert_eq!(report.detail.len(), report.summary.len());
        for (detail, summary) in report.detail.iter().zip(&report.summary) {
            assert_eq!(detail.project_id, summary.project_id);
            assert_eq!(summary.total_hours, stable_sum(detail.hours.iter().copied()));
        }
    }

    #[test]
    fn test_tables_unchanged_under_record_permutation() {
        let policy = ClassificationPolicy::new(["@int.example"]);
        let mut records = vec![
            TaskRecord::new("10", 0.1).with_assignee("x@int.example"),
            TaskRecord::new("10", 0.2).with_assignee("x@int.example"),
            TaskRecord::new("10", 0.3).with_assignee("x@int.example"),
            TaskRecord::new("10", 0.7).with_assignee("y@ext.example"),
            TaskRecord::new("10", 0.1),
            TaskRecord::new("2", 0.3).with_assignee("y@ext.example"),
            TaskRecord::new("2", 0.2).with_assignee("y@ext.example"),
            TaskRecord::new("2", 0.1).with_assignee("x@int.example"),
            TaskRecord::new("2", 1.1),
            TaskRecord::new("2", 0.05),
        ];

        let baseline = build_report(&records, &policy).unwrap();
        let detail = baseline.detail_table().unwrap();
        let summary = baseline.summary_table();

        for shift in 1..records.len() {
            records.rotate_left(1);
            let report = build_report(&records, &policy).unwrap();
            assert_eq!(report.detail_table().unwrap(), detail, "rotation {shift}");
            assert_eq!(report.summary_table(), summary, "rotation {shift}");

            records.reverse();
            let report = build_report(&records, &policy).unwrap();
            assert_eq!(report.detail_table().unwrap(), detail, "reversed {shift}");
            records.reverse();
        }

        let p10 = &baseline.detail[1];
        assert_eq!(p10.hours_for(&baseline.schema, "x@int.example"), Some(0.6));

        for (row, cells) in baseline.summary.iter().zip(&detail.rows) {
            let cell_sum = stable_sum(cells.iter().skip(2).map(Cell::as_number));
            assert_eq!(row.total_hours, cell_sum);
        }
    }

    #[test]
    fn test_tables_render() {
        let policy = ClassificationPolicy::new(["@int.example"]);
        let report = build_report(&example_records(), &policy).unwrap();

        let detail = report.detail_table().unwrap();
        assert_eq!(
            detail.header,
            vec![
                "project_id",
                "project_name",
                UNASSIGNED_KEY,
                "x@int.example",
                "y@ext.example"
            ]
        );
        assert_eq!(
            detail.rows[0],
            vec![
                Cell::text("'1"),
                Cell::text(""),
                Cell::Number(2.0),
                Cell::Number(3.0),
                Cell::Number(0.0),
            ]
        );

        let summary = report.summary_table();
        assert_eq!(summary.width(), 6);
        assert_eq!(summary.rows[1][0], Cell::text("'2"));
        assert_eq!(summary.rows[1][5], Cell::Number(5.0));
    }

    #[test]
    fn test_corrupted_row_is_inconsistency() {
        let mut report =
            build_report(&example_records(), &ClassificationPolicy::default()).unwrap();
        report.detail[0].hours.pop();
        assert!(matches!(
            report.detail_table(),
            Err(ReportError::SchemaInconsistency(_))
        ));
    }
}
