//! Dry-run sink.
//!
//! Stands in for the live store when nothing may be written. Each call is
//! logged, and a sample of the rows that would have been appended goes to the
//! log. The writes land in an in-memory store so the would-be tables can be
//! inspected afterwards.
//!
//! With a lookup store attached, sheet lookups are answered by the live store,
//! so a sheet missing there is missing here too and the log shows the same
//! create step a live run would take. Nothing else reaches the live store.
//! Without one, every sheet is reported as present.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use booked_models::{Cell, Table};

use crate::error::Result;
use crate::local::{MemorySheetStore, StoreOp};
use crate::store::{SheetInfo, TabularStore};

/// Rows logged per sheet.
pub const SAMPLE_ROWS: usize = 10;

/// Logging store that never changes a real document.
pub struct DryRunStore {
    inner: MemorySheetStore,
    lookup: Option<Arc<dyn TabularStore>>,
    logged_rows: Mutex<HashMap<String, usize>>,
}

impl fmt::Debug for DryRunStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DryRunStore")
            .field("inner", &self.inner)
            .field("lookup", &self.lookup.as_ref().map(|store| store.name()))
            .finish_non_exhaustive()
    }
}

impl Default for DryRunStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DryRunStore {
    /// Creates a dry-run store where every sheet already exists.
    pub fn new() -> Self {
        Self {
            inner: MemorySheetStore::new().with_name("dry-run").auto_provisioning(),
            lookup: None,
            logged_rows: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a dry-run store that asks `live` which sheets exist.
    ///
    /// Only [`TabularStore::find_sheet`] is ever called on `live`.
    pub fn with_lookup(live: Arc<dyn TabularStore>) -> Self {
        Self {
            inner: MemorySheetStore::new().with_name("dry-run"),
            lookup: Some(live),
            logged_rows: Mutex::new(HashMap::new()),
        }
    }

    /// Table that would have been written to `title`.
    pub async fn table(&self, title: &str) -> Option<Table> {
        self.inner.table(title).await
    }

    /// Every call made so far, in order.
    pub async fn operations(&self) -> Vec<StoreOp> {
        self.inner.operations().await
    }
}

#[async_trait]
impl TabularStore for DryRunStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn find_sheet(&self, title: &str) -> Result<Option<SheetInfo>> {
        let found = self.inner.find_sheet(title).await?;
        let Some(live) = self.lookup.as_ref().filter(|_| found.is_none()) else {
            return Ok(found);
        };

        let Some(sheet) = live.find_sheet(title).await? else {
            info!(title, store = %live.name(), "dry run: sheet missing in live store");
            return Ok(None);
        };
        self.inner.insert_sheet(sheet.clone()).await;
        Ok(Some(sheet))
    }

    async fn create_sheet(&self, title: &str) -> Result<SheetInfo> {
        info!(title, "dry run: would create sheet");
        self.inner.create_sheet(title).await
    }

    async fn resize_columns(&self, sheet: &SheetInfo, columns: usize) -> Result<()> {
        info!(title = %sheet.title, from = sheet.column_count, to = columns, "dry run: would resize sheet");
        self.inner.resize_columns(sheet, columns).await
    }

    async fn clear(&self, sheet: &SheetInfo) -> Result<()> {
        info!(title = %sheet.title, "dry run: would clear sheet");
        self.inner.clear(sheet).await
    }

    async fn set_header(&self, sheet: &SheetInfo, header: &[String]) -> Result<()> {
        info!(title = %sheet.title, header = ?header, "dry run: would write header");
        self.inner.set_header(sheet, header).await
    }

    async fn append_rows(&self, sheet: &SheetInfo, rows: &[Vec<Cell>]) -> Result<()> {
        info!(title = %sheet.title, rows = rows.len(), "dry run: would append rows");

        let mut logged = self.logged_rows.lock().await;
        let count = logged.entry(sheet.title.clone()).or_insert(0);
        for row in rows.iter().take(SAMPLE_ROWS.saturating_sub(*count)) {
            let values = serde_json::to_string(row).unwrap_or_default();
            info!(title = %sheet.title, row = %values, "dry run: sample row");
            *count += 1;
        }
        drop(logged);

        self.inner.append_rows(sheet, rows).await
    }
}
