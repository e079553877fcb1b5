//! In-memory tabular store for development and testing.
//!
//! Keeps sheets in process and journals every call, so callers can check
//! exactly which operations ran and in what order. Failures can be injected
//! per sheet and operation, and grid limits are enforced the way a real
//! spreadsheet enforces them: writes wider than the sheet are rejected.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use booked_models::{Cell, Table};

use crate::error::{Result, StoreError};
use crate::store::{SheetInfo, TabularStore};

/// Rows in a newly created sheet.
pub const DEFAULT_ROW_COUNT: usize = 1000;

/// Columns in a newly created sheet.
pub const DEFAULT_COLUMN_COUNT: usize = 26;

/// Kind of store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Find,
    Create,
    Resize,
    Clear,
    Header,
    Append,
}

/// One journaled store call.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp {
    FindSheet(String),
    CreateSheet(String),
    ResizeColumns { title: String, columns: usize },
    Clear(String),
    SetHeader { title: String, header: Vec<String> },
    AppendRows { title: String, rows: usize },
}

impl StoreOp {
    /// Operation kind.
    pub fn kind(&self) -> OpKind {
        match self {
            StoreOp::FindSheet(_) => OpKind::Find,
            StoreOp::CreateSheet(_) => OpKind::Create,
            StoreOp::ResizeColumns { .. } => OpKind::Resize,
            StoreOp::Clear(_) => OpKind::Clear,
            StoreOp::SetHeader { .. } => OpKind::Header,
            StoreOp::AppendRows { .. } => OpKind::Append,
        }
    }

    /// Title of the sheet the call targeted.
    pub fn title(&self) -> &str {
        match self {
            StoreOp::FindSheet(title)
            | StoreOp::CreateSheet(title)
            | StoreOp::Clear(title)
            | StoreOp::ResizeColumns { title, .. }
            | StoreOp::SetHeader { title, .. }
            | StoreOp::AppendRows { title, .. } => title,
        }
    }

    /// Returns true for calls that change the document.
    pub fn is_mutation(&self) -> bool {
        self.kind() != OpKind::Find
    }
}

#[derive(Debug, Clone)]
struct MemorySheet {
    info: SheetInfo,
    header: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// In-memory tabular store.
#[derive(Debug)]
pub struct MemorySheetStore {
    name: String,
    sheets: RwLock<BTreeMap<String, MemorySheet>>,
    journal: RwLock<Vec<StoreOp>>,
    failures: Vec<(String, OpKind)>,
    auto_provision: bool,
    next_id: AtomicI64,
}

impl Default for MemorySheetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySheetStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            name: "memory".to_string(),
            sheets: RwLock::new(BTreeMap::new()),
            journal: RwLock::new(Vec::new()),
            failures: Vec::new(),
            auto_provision: false,
            next_id: AtomicI64::new(1),
        }
    }

    /// Sets the name reported in logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds an empty sheet with the given column count.
    pub fn with_sheet(mut self, title: &str, column_count: usize) -> Self {
        let info = SheetInfo::new(self.allocate_id(), title, DEFAULT_ROW_COUNT, column_count);
        self.sheets.get_mut().insert(
            title.to_string(),
            MemorySheet {
                info,
                header: Vec::new(),
                rows: Vec::new(),
            },
        );
        self
    }

    /// Adds a sheet already holding `table`.
    pub fn with_table(mut self, title: &str, table: &Table) -> Self {
        let columns = table.width().max(DEFAULT_COLUMN_COUNT);
        let rows = (table.len() + 1).max(DEFAULT_ROW_COUNT);
        let info = SheetInfo::new(self.allocate_id(), title, rows, columns);
        self.sheets.get_mut().insert(
            title.to_string(),
            MemorySheet {
                info,
                header: table.header.clone(),
                rows: table.rows.clone(),
            },
        );
        self
    }

    /// Makes lookups of unknown titles succeed with a default-sized sheet.
    pub fn auto_provisioning(mut self) -> Self {
        self.auto_provision = true;
        self
    }

    /// Makes every `kind` call on `title` fail.
    pub fn fail_on(mut self, title: &str, kind: OpKind) -> Self {
        self.failures.push((title.to_string(), kind));
        self
    }

    /// Every call made so far, in order.
    pub async fn operations(&self) -> Vec<StoreOp> {
        self.journal.read().await.clone()
    }

    /// Number of calls that changed the document.
    pub async fn mutation_count(&self) -> usize {
        self.journal
            .read()
            .await
            .iter()
            .filter(|op| op.is_mutation())
            .count()
    }

    /// Current contents of a sheet.
    pub async fn table(&self, title: &str) -> Option<Table> {
        self.sheets
            .read()
            .await
            .get(title)
            .map(|sheet| Table::new(sheet.header.clone(), sheet.rows.clone()))
    }

    /// Current dimensions of a sheet.
    pub async fn sheet(&self, title: &str) -> Option<SheetInfo> {
        self.sheets.read().await.get(title).map(|sheet| sheet.info.clone())
    }

    /// Registers a sheet that already exists elsewhere, without journaling.
    pub(crate) async fn insert_sheet(&self, info: SheetInfo) {
        self.sheets
            .write()
            .await
            .entry(info.title.clone())
            .or_insert(MemorySheet {
                info,
                header: Vec::new(),
                rows: Vec::new(),
            });
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    async fn record(&self, op: StoreOp) -> Result<()> {
        let kind = op.kind();
        let title = op.title().to_string();
        debug!(store = %self.name, ?op, "store call");
        self.journal.write().await.push(op);

        if self.failures.iter().any(|(t, k)| *t == title && *k == kind) {
            return Err(StoreError::Unavailable(format!(
                "simulated {:?} failure on {}",
                kind, title
            )));
        }
        Ok(())
    }

    fn new_sheet(&self, title: &str) -> MemorySheet {
        MemorySheet {
            info: SheetInfo::new(
                self.allocate_id(),
                title,
                DEFAULT_ROW_COUNT,
                DEFAULT_COLUMN_COUNT,
            ),
            header: Vec::new(),
            rows: Vec::new(),
        }
    }
}

#[async_trait]
impl TabularStore for MemorySheetStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_sheet(&self, title: &str) -> Result<Option<SheetInfo>> {
        self.record(StoreOp::FindSheet(title.to_string())).await?;

        let mut sheets = self.sheets.write().await;
        if self.auto_provision && !sheets.contains_key(title) {
            sheets.insert(title.to_string(), self.new_sheet(title));
        }
        Ok(sheets.get(title).map(|sheet| sheet.info.clone()))
    }

    async fn create_sheet(&self, title: &str) -> Result<SheetInfo> {
        self.record(StoreOp::CreateSheet(title.to_string())).await?;

        let mut sheets = self.sheets.write().await;
        if sheets.contains_key(title) {
            return Err(StoreError::Api {
                status: 400,
                message: format!("a sheet with the name \"{}\" already exists", title),
            });
        }
        let sheet = self.new_sheet(title);
        let info = sheet.info.clone();
        sheets.insert(title.to_string(), sheet);
        Ok(info)
    }

    async fn resize_columns(&self, sheet: &SheetInfo, columns: usize) -> Result<()> {
        self.record(StoreOp::ResizeColumns {
            title: sheet.title.clone(),
            columns,
        })
        .await?;

        let mut sheets = self.sheets.write().await;
        let stored = sheets
            .get_mut(&sheet.title)
            .ok_or_else(|| StoreError::ResourceMissing(sheet.title.clone()))?;
        stored.info.column_count = stored.info.column_count.max(columns);
        Ok(())
    }

    async fn clear(&self, sheet: &SheetInfo) -> Result<()> {
        self.record(StoreOp::Clear(sheet.title.clone())).await?;

        let mut sheets = self.sheets.write().await;
        let stored = sheets
            .get_mut(&sheet.title)
            .ok_or_else(|| StoreError::ResourceMissing(sheet.title.clone()))?;
        stored.header.clear();
        stored.rows.clear();
        Ok(())
    }

    async fn set_header(&self, sheet: &SheetInfo, header: &[String]) -> Result<()> {
        self.record(StoreOp::SetHeader {
            title: sheet.title.clone(),
            header: header.to_vec(),
        })
        .await?;

        let mut sheets = self.sheets.write().await;
        let stored = sheets
            .get_mut(&sheet.title)
            .ok_or_else(|| StoreError::ResourceMissing(sheet.title.clone()))?;
        check_width(&stored.info, header.len())?;
        stored.header = header.to_vec();
        Ok(())
    }

    async fn append_rows(&self, sheet: &SheetInfo, rows: &[Vec<Cell>]) -> Result<()> {
        self.record(StoreOp::AppendRows {
            title: sheet.title.clone(),
            rows: rows.len(),
        })
        .await?;

        let mut sheets = self.sheets.write().await;
        let stored = sheets
            .get_mut(&sheet.title)
            .ok_or_else(|| StoreError::ResourceMissing(sheet.title.clone()))?;
        let widest = rows.iter().map(Vec::len).max().unwrap_or(0);
        check_width(&stored.info, widest)?;

        stored.rows.extend_from_slice(rows);
        stored.info.row_count = stored.info.row_count.max(stored.rows.len() + 1);
        Ok(())
    }
}

fn check_width(info: &SheetInfo, needed: usize) -> Result<()> {
    if needed > info.column_count {
        return Err(StoreError::GridLimit {
            title: info.title.clone(),
            columns: info.column_count,
            needed,
        });
    }
    Ok(())
}
