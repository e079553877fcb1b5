//! Rendering aggregates into complete, ordered detail rows.

use booked_models::{DetailRow, ReportSchema};

use crate::aggregate::Aggregates;
use crate::error::{ReportError, Result};
use crate::ordering::{compare_project_ids, format_project_id, format_project_name};

/// Builds one row per aggregate, every schema column filled, sorted by id.
///
/// Missing assignee columns are zero. The returned order is the canonical
/// row order for both the detail and the summary table.
///
/// # Errors
/// Returns [`ReportError::SchemaInconsistency`] if an aggregate has an
/// assignee key the schema does not know about.
pub fn normalize_rows(aggregates: &Aggregates, schema: &ReportSchema) -> Result<Vec<DetailRow>> {
    let mut rows = Vec::with_capacity(aggregates.len());

    for aggregate in aggregates.values() {
        if let Some(unknown) = aggregate
            .hours_by_assignee
            .keys()
            .find(|key| !schema.assignees().contains(*key))
        {
            return Err(ReportError::SchemaInconsistency(format!(
                "project {} has assignee column {:?} missing from the schema",
                aggregate.project_id, unknown
            )));
        }

        rows.push(DetailRow {
            project_id: aggregate.project_id.clone(),
            project_cell: format_project_id(&aggregate.project_id),
            project_name: aggregate.project_name.clone(),
            name_cell: format_project_name(&aggregate.project_name),
            hours: schema
                .assignees()
                .iter()
                .map(|key| aggregate.hours_for(key))
                .collect(),
        });
    }

    rows.sort_by(|a, b| compare_project_ids(&a.project_id, &b.project_id));
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_records;
    use crate::schema::build_schema;
    use booked_models::{TaskRecord, UNASSIGNED_KEY};

    #[test]
    fn test_missing_columns_default_to_zero() {
        let records = vec![
            TaskRecord::new("1", 3.0).with_assignee("x@int.example"),
            TaskRecord::new("1", 2.0),
            TaskRecord::new("2", 5.0).with_assignee("y@ext.example"),
        ];
        let aggregates = aggregate_records(&records).unwrap();
        let schema = build_schema(&aggregates);
        let rows = normalize_rows(&aggregates, &schema).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].project_id, "1");
        assert_eq!(rows[0].hours_for(&schema, "x@int.example"), Some(3.0));
        assert_eq!(rows[0].hours_for(&schema, UNASSIGNED_KEY), Some(2.0));
        assert_eq!(rows[0].hours_for(&schema, "y@ext.example"), Some(0.0));
        assert_eq!(rows[1].project_id, "2");
        assert_eq!(rows[1].hours_for(&schema, "y@ext.example"), Some(5.0));
        assert!(rows.iter().all(|r| r.hours.len() == schema.assignees().len()));
    }

    #[test]
    fn test_ids_are_marked_and_sorted() {
        let records = vec![
            TaskRecord::new("98765432109876543210", 1.0),
            TaskRecord::new("12345", 1.0),
            TaskRecord::new("123456789012345", 1.0),
            TaskRecord::new("beta", 1.0),
            TaskRecord::new("alpha0", 1.0),
        ];
        let aggregates = aggregate_records(&records).unwrap();
        let schema = build_schema(&aggregates);
        let rows = normalize_rows(&aggregates, &schema).unwrap();

        let ids: Vec<&str> = rows.iter().map(|r| r.project_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "12345",
                "123456789012345",
                "98765432109876543210",
                "alpha0",
                "beta"
            ]
        );

        let cells: Vec<&str> = rows.iter().map(|r| r.project_cell.as_str()).collect();
        assert_eq!(
            cells,
            vec![
                "'12345",
                "'123456789012345",
                "'98765432109876543210",
                "'alpha0",
                "beta"
            ]
        );
    }

    #[test]
    fn test_names_are_kept_literal() {
        let records = vec![
            TaskRecord::new("1", 1.0).with_project_name("=IMPORTRANGE(\"x\")"),
            TaskRecord::new("2", 1.0).with_project_name("0012"),
            TaskRecord::new("3", 1.0),
        ];
        let aggregates = aggregate_records(&records).unwrap();
        let schema = build_schema(&aggregates);
        let rows = normalize_rows(&aggregates, &schema).unwrap();

        assert_eq!(rows[0].project_name, "=IMPORTRANGE(\"x\")");
        assert_eq!(rows[0].name_cell, "'=IMPORTRANGE(\"x\")");
        assert_eq!(rows[1].name_cell, "'0012");
        assert_eq!(rows[2].name_cell, "");
    }

    #[test]
    fn test_rows_strictly_ascending() {
        let records: Vec<TaskRecord> = ["300", "20", "1", "4000", "55", "x9", "x10"]
            .iter()
            .map(|id| TaskRecord::new(*id, 1.0))
            .collect();
        let aggregates = aggregate_records(&records).unwrap();
        let schema = build_schema(&aggregates);
        let rows = normalize_rows(&aggregates, &schema).unwrap();

        for pair in rows.windows(2) {
            assert_eq!(
                compare_project_ids(&pair[0].project_id, &pair[1].project_id),
                std::cmp::Ordering::Less
            );
        }
    }

    #[test]
    fn test_unknown_column_is_inconsistency() {
        let records = vec![TaskRecord::new("1", 1.0).with_assignee("a@x.io")];
        let aggregates = aggregate_records(&records).unwrap();
        let result = normalize_rows(&aggregates, &ReportSchema::default());
        assert!(matches!(result, Err(ReportError::SchemaInconsistency(_))));
    }
}
