//! Report schema and row types.

use serde::{Deserialize, Serialize};

use crate::table::{Cell, Table};

/// Header of the project identifier column.
pub const PROJECT_ID_COLUMN: &str = "project_id";

/// Header of the project name column.
pub const PROJECT_NAME_COLUMN: &str = "project_name";

/// Header row of the summary table.
pub const SUMMARY_HEADER: [&str; 6] = [
    PROJECT_ID_COLUMN,
    PROJECT_NAME_COLUMN,
    "internal",
    "external",
    "unassigned",
    "total_hours",
];

/// Classification outcome for an assignee key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Assignee belongs to one of the internal domains.
    Internal,
    /// Any other assignee.
    External,
    /// No assignee recorded.
    Unassigned,
}

/// Ordered column set of the detail table.
///
/// The two identifier columns always come first, followed by one hour column
/// per assignee key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportSchema {
    assignees: Vec<String>,
}

impl ReportSchema {
    /// Creates a schema from already ordered assignee keys.
    pub fn new(assignees: Vec<String>) -> Self {
        Self { assignees }
    }

    /// Assignee keys, in column order.
    pub fn assignees(&self) -> &[String] {
        &self.assignees
    }

    /// Number of columns including the identifier columns.
    pub fn width(&self) -> usize {
        self.assignees.len() + 2
    }

    /// Full header row.
    pub fn header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(self.width());
        header.push(PROJECT_ID_COLUMN.to_string());
        header.push(PROJECT_NAME_COLUMN.to_string());
        header.extend(self.assignees.iter().cloned());
        header
    }
}

/// One project rendered against a [`ReportSchema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    /// Raw project identifier, used for ordering.
    pub project_id: String,

    /// Identifier as written to the sheet (text marker applied).
    pub project_cell: String,

    /// Project display name, empty when unknown.
    pub project_name: String,

    /// Name as written to the sheet (text marker applied).
    pub name_cell: String,

    /// Hours aligned with [`ReportSchema::assignees`].
    pub hours: Vec<f64>,
}

impl DetailRow {
    /// Pairs each hour value with its assignee key.
    pub fn hours_by_column<'a>(
        &'a self,
        schema: &'a ReportSchema,
    ) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        schema
            .assignees()
            .iter()
            .map(String::as_str)
            .zip(self.hours.iter().copied())
    }

    /// Hours for a given assignee column, if the schema has it.
    pub fn hours_for(&self, schema: &ReportSchema, key: &str) -> Option<f64> {
        self.hours_by_column(schema)
            .find(|(column, _)| *column == key)
            .map(|(_, hours)| hours)
    }

    /// Renders the row as sheet cells.
    pub fn to_cells(&self) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(self.hours.len() + 2);
        cells.push(Cell::text(&self.project_cell));
        cells.push(Cell::text(&self.name_cell));
        cells.extend(self.hours.iter().copied().map(Cell::Number));
        cells
    }
}

/// Per-project bucket totals, aligned with the detail rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Raw project identifier.
    pub project_id: String,

    /// Identifier as written to the sheet.
    pub project_cell: String,

    /// Project display name.
    pub project_name: String,

    /// Name as written to the sheet.
    pub name_cell: String,

    /// Hours booked by internal assignees.
    pub internal: f64,

    /// Hours booked by external assignees.
    pub external: f64,

    /// Hours without an assignee.
    pub unassigned: f64,

    /// Sum of every hour cell of the detail row.
    pub total_hours: f64,
}

impl SummaryRow {
    /// Renders the row as sheet cells in [`SUMMARY_HEADER`] order.
    pub fn to_cells(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.project_cell),
            Cell::text(&self.name_cell),
            Cell::Number(self.internal),
            Cell::Number(self.external),
            Cell::Number(self.unassigned),
            Cell::Number(self.total_hours),
        ]
    }

    /// Builds the summary table from ordered rows.
    pub fn table(rows: &[SummaryRow]) -> Table {
        Table::new(
            SUMMARY_HEADER.iter().map(|h| h.to_string()).collect(),
            rows.iter().map(SummaryRow::to_cells).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ReportSchema {
        ReportSchema::new(vec!["a@x.io".to_string(), "b@y.io".to_string()])
    }

    #[test]
    fn test_schema_header() {
        let schema = schema();
        assert_eq!(schema.width(), 4);
        assert_eq!(
            schema.header(),
            vec!["project_id", "project_name", "a@x.io", "b@y.io"]
        );
    }

    #[test]
    fn test_empty_schema_keeps_identifier_columns() {
        let schema = ReportSchema::default();
        assert_eq!(schema.header(), vec!["project_id", "project_name"]);
    }

    #[test]
    fn test_detail_row_lookup_and_cells() {
        let schema = schema();
        let row = DetailRow {
            project_id: "10".to_string(),
            project_cell: "'10".to_string(),
            project_name: "=Site".to_string(),
            name_cell: "'=Site".to_string(),
            hours: vec![1.5, 0.0],
        };

        assert_eq!(row.hours_for(&schema, "a@x.io"), Some(1.5));
        assert_eq!(row.hours_for(&schema, "b@y.io"), Some(0.0));
        assert_eq!(row.hours_for(&schema, "c@z.io"), None);

        let cells = row.to_cells();
        assert_eq!(cells.len(), schema.width());
        assert_eq!(cells[0], Cell::text("'10"));
        assert_eq!(cells[1], Cell::text("'=Site"));
        assert_eq!(cells[2], Cell::Number(1.5));
    }

    #[test]
    fn test_summary_table_header() {
        let table = SummaryRow::table(&[]);
        assert_eq!(table.header, SUMMARY_HEADER.to_vec());
        assert!(table.rows.is_empty());
    }
}
