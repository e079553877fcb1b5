//! Clear-then-write reconciliation of one sheet.
//!
//! Each target sheet is brought to exactly the rendered table:
//!
//! 1. look up the sheet, creating it when absent and creation is allowed
//! 2. grow the column count if the table is wider
//! 3. clear all old values
//! 4. write the header row
//! 5. append the data rows in batches, in order
//!
//! A failure stops the sequence for that sheet and reports the step. Nothing
//! is rolled back.

use tracing::{debug, info};

use booked_models::Table;

use crate::error::{RemoteWriteError, StoreError, WriteStep};
use crate::store::TabularStore;

/// Rows per append call.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Sheet to reconcile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTarget {
    /// Sheet title.
    pub title: String,
    /// Create the sheet when it does not exist.
    pub create_if_missing: bool,
}

impl SheetTarget {
    /// A sheet that must already exist.
    pub fn existing(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            create_if_missing: false,
        }
    }

    /// A sheet created on first use.
    pub fn create_if_missing(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            create_if_missing: true,
        }
    }
}

/// What a successful reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Sheet title.
    pub title: String,
    /// Data rows written.
    pub rows: usize,
    /// Append calls made.
    pub batches: usize,
    /// The sheet was created.
    pub created: bool,
    /// The sheet was grown to this many columns.
    pub resized_to: Option<usize>,
}

/// Writes rendered tables to a store.
pub struct Reconciler<'a> {
    store: &'a dyn TabularStore,
    batch_size: usize,
}

impl<'a> Reconciler<'a> {
    /// Creates a reconciler. A zero batch size is treated as one.
    pub fn new(store: &'a dyn TabularStore, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
        }
    }

    /// Replaces the contents of `target` with `table`.
    ///
    /// # Errors
    /// Returns [`RemoteWriteError`] naming the sheet and the failed step.
    pub async fn replace(
        &self,
        target: &SheetTarget,
        table: &Table,
    ) -> std::result::Result<WriteOutcome, RemoteWriteError> {
        let title = target.title.as_str();
        let fail = move |step: WriteStep| {
            move |source: StoreError| RemoteWriteError {
                resource: title.to_string(),
                step,
                source,
            }
        };

        let mut created = false;
        let mut sheet = match self
            .store
            .find_sheet(title)
            .await
            .map_err(fail(WriteStep::Lookup))?
        {
            Some(sheet) => sheet,
            None if target.create_if_missing => {
                created = true;
                self.store
                    .create_sheet(title)
                    .await
                    .map_err(fail(WriteStep::Create))?
            }
            None => {
                return Err(fail(WriteStep::Lookup)(StoreError::ResourceMissing(
                    title.to_string(),
                )))
            }
        };

        info!(
            store = self.store.name(),
            title,
            row_count = sheet.row_count,
            column_count = sheet.column_count,
            rows = table.len(),
            width = table.width(),
            "reconciling sheet"
        );

        let mut resized_to = None;
        if table.width() > sheet.column_count {
            self.store
                .resize_columns(&sheet, table.width())
                .await
                .map_err(fail(WriteStep::Resize))?;
            debug!(title, from = sheet.column_count, to = table.width(), "grew sheet");
            sheet.column_count = table.width();
            resized_to = Some(table.width());
        }

        self.store
            .clear(&sheet)
            .await
            .map_err(fail(WriteStep::Clear))?;

        self.store
            .set_header(&sheet, &table.header)
            .await
            .map_err(fail(WriteStep::Header))?;

        let mut batches = 0;
        for (batch, rows) in table.batches(self.batch_size).enumerate() {
            self.store
                .append_rows(&sheet, rows)
                .await
                .map_err(fail(WriteStep::Append { batch }))?;
            debug!(title, batch, rows = rows.len(), "appended batch");
            batches += 1;
        }

        info!(title, rows = table.len(), batches, "sheet written");
        Ok(WriteOutcome {
            title: title.to_string(),
            rows: table.len(),
            batches,
            created,
            resized_to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::{MemorySheetStore, OpKind, StoreOp};
    use booked_models::Cell;

    fn table(width: usize, rows: usize) -> Table {
        let header = (0..width).map(|i| format!("c{}", i)).collect();
        let rows = (0..rows)
            .map(|r| (0..width).map(|c| Cell::Number((r * width + c) as f64)).collect())
            .collect();
        Table::new(header, rows)
    }

    #[tokio::test]
    async fn test_protocol_order() {
        let store = MemorySheetStore::new().with_sheet("Detail", 2);
        let reconciler = Reconciler::new(&store, 2);

        let outcome = reconciler
            .replace(&SheetTarget::existing("Detail"), &table(3, 5))
            .await
            .unwrap();

        assert_eq!(outcome.batches, 3);
        assert_eq!(outcome.resized_to, Some(3));
        assert!(!outcome.created);

        let kinds: Vec<OpKind> = store.operations().await.iter().map(StoreOp::kind).collect();
        assert_eq!(
            kinds,
            vec![
                OpKind::Find,
                OpKind::Resize,
                OpKind::Clear,
                OpKind::Header,
                OpKind::Append,
                OpKind::Append,
                OpKind::Append,
            ]
        );
        assert_eq!(store.table("Detail").await.unwrap(), table(3, 5));
    }

    #[tokio::test]
    async fn test_replaces_stale_contents() {
        let store = MemorySheetStore::new().with_table("Detail", &table(4, 30));
        let reconciler = Reconciler::new(&store, DEFAULT_BATCH_SIZE);

        reconciler
            .replace(&SheetTarget::existing("Detail"), &table(2, 3))
            .await
            .unwrap();

        assert_eq!(store.table("Detail").await.unwrap(), table(2, 3));
        assert_eq!(store.sheet("Detail").await.unwrap().column_count, 26);
    }

    #[tokio::test]
    async fn test_missing_sheet_without_create_fails_at_lookup() {
        let store = MemorySheetStore::new();
        let reconciler = Reconciler::new(&store, DEFAULT_BATCH_SIZE);

        let err = reconciler
            .replace(&SheetTarget::existing("Detail"), &table(2, 1))
            .await
            .unwrap_err();

        assert_eq!(err.resource, "Detail");
        assert_eq!(err.step, WriteStep::Lookup);
        assert!(matches!(err.source, StoreError::ResourceMissing(_)));
        assert_eq!(store.mutation_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_sheet_is_created() {
        let store = MemorySheetStore::new();
        let reconciler = Reconciler::new(&store, DEFAULT_BATCH_SIZE);

        let outcome = reconciler
            .replace(&SheetTarget::create_if_missing("Summary"), &table(6, 2))
            .await
            .unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.resized_to, None);
        assert_eq!(store.table("Summary").await.unwrap(), table(6, 2));
    }

    #[tokio::test]
    async fn test_header_only_table() {
        let store = MemorySheetStore::new().with_sheet("Detail", 26);
        let reconciler = Reconciler::new(&store, DEFAULT_BATCH_SIZE);

        let outcome = reconciler
            .replace(&SheetTarget::existing("Detail"), &table(2, 0))
            .await
            .unwrap();

        assert_eq!(outcome.batches, 0);
        assert_eq!(store.table("Detail").await.unwrap().header.len(), 2);
    }

    #[tokio::test]
    async fn test_append_failure_reports_batch() {
        let store = MemorySheetStore::new()
            .with_sheet("Detail", 26)
            .fail_on("Detail", OpKind::Append);
        let reconciler = Reconciler::new(&store, 2);

        let err = reconciler
            .replace(&SheetTarget::existing("Detail"), &table(2, 5))
            .await
            .unwrap_err();

        assert_eq!(err.step, WriteStep::Append { batch: 0 });
        let appends = store
            .operations()
            .await
            .iter()
            .filter(|op| op.kind() == OpKind::Append)
            .count();
        assert_eq!(appends, 1);
    }

    #[tokio::test]
    async fn test_clear_failure_stops_before_header() {
        let store = MemorySheetStore::new()
            .with_table("Detail", &table(2, 3))
            .fail_on("Detail", OpKind::Clear);
        let reconciler = Reconciler::new(&store, DEFAULT_BATCH_SIZE);

        let err = reconciler
            .replace(&SheetTarget::existing("Detail"), &table(2, 1))
            .await
            .unwrap_err();

        assert_eq!(err.step, WriteStep::Clear);
        assert_eq!(store.operations().await.last().map(StoreOp::kind), Some(OpKind::Clear));
        assert_eq!(store.table("Detail").await.unwrap(), table(2, 3));
    }
}
