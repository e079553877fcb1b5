//! TabularStore trait definition for spreadsheet backends.
//!
//! A store exposes named sheets inside one spreadsheet document and the small
//! set of operations the reconciler needs: look up, create, grow, clear,
//! write a header and append rows.

use async_trait::async_trait;

use booked_models::Cell;

use crate::error::Result;

/// Dimensions and identity of one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetInfo {
    /// Backend-specific sheet id.
    pub sheet_id: i64,
    /// Sheet title, unique within the document.
    pub title: String,
    /// Current row capacity.
    pub row_count: usize,
    /// Current column capacity.
    pub column_count: usize,
}

impl SheetInfo {
    /// Creates a sheet description.
    pub fn new(sheet_id: i64, title: impl Into<String>, row_count: usize, column_count: usize) -> Self {
        Self {
            sheet_id,
            title: title.into(),
            row_count,
            column_count,
        }
    }
}

/// Trait for spreadsheet backends.
///
/// Operations are not atomic across calls. Callers that need a consistent
/// end state must sequence them, see [`crate::Reconciler`].
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Looks up a sheet by title.
    async fn find_sheet(&self, title: &str) -> Result<Option<SheetInfo>>;

    /// Creates an empty sheet with backend default dimensions.
    async fn create_sheet(&self, title: &str) -> Result<SheetInfo>;

    /// Grows the sheet to at least `columns` columns. Never removes columns.
    async fn resize_columns(&self, sheet: &SheetInfo, columns: usize) -> Result<()>;

    /// Removes every value from the sheet. Dimensions are kept.
    async fn clear(&self, sheet: &SheetInfo) -> Result<()>;

    /// Writes `header` into the first row.
    async fn set_header(&self, sheet: &SheetInfo, header: &[String]) -> Result<()>;

    /// Appends rows after the last non-empty row, in order.
    async fn append_rows(&self, sheet: &SheetInfo, rows: &[Vec<Cell>]) -> Result<()>;
}
