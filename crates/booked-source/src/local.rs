//! Local task source for offline runs and testing.
//!
//! Serves a fixed record set, either built in code or read from a JSON file
//! holding an array of task records. Connection attempts can be made to fail
//! a number of times, and open connections are counted, so callers can check
//! retry and release behaviour without a database.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use booked_models::TaskRecord;

use crate::error::{Result, SourceError};
use crate::source::{SourceConnection, TaskSource};

/// In-process task source.
#[derive(Debug, Default)]
pub struct LocalSource {
    /// Records served by every connection.
    records: Arc<Vec<TaskRecord>>,
    /// File the records came from, for logs.
    origin: Option<PathBuf>,
    /// Remaining connection attempts that should fail.
    failing_connects: AtomicU32,
    /// Total connection attempts.
    connect_attempts: AtomicUsize,
    /// Connections handed out and not yet closed.
    open: Arc<AtomicUsize>,
    /// Whether reads should fail.
    fail_reads: bool,
}

impl LocalSource {
    /// Creates a source serving `records`.
    pub fn new(records: Vec<TaskRecord>) -> Self {
        Self {
            records: Arc::new(records),
            ..Self::default()
        }
    }

    /// Reads records from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let records: Vec<TaskRecord> = serde_json::from_str(&data)?;
        info!(path = %path.display(), count = records.len(), "loaded task records from file");

        Ok(Self {
            records: Arc::new(records),
            origin: Some(path.to_path_buf()),
            ..Self::default()
        })
    }

    /// Makes the next `count` connection attempts fail.
    pub fn with_failing_connects(self, count: u32) -> Self {
        self.failing_connects.store(count, Ordering::SeqCst);
        self
    }

    /// Makes every read fail after connecting.
    pub fn with_failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Number of connection attempts so far.
    pub fn connect_attempts(&self) -> usize {
        self.connect_attempts.load(Ordering::SeqCst)
    }

    /// Number of connections not yet closed.
    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskSource for LocalSource {
    fn describe(&self) -> String {
        match &self.origin {
            Some(path) => format!("local file {}", path.display()),
            None => "local records".to_string(),
        }
    }

    async fn connect(&self) -> Result<Box<dyn SourceConnection>> {
        self.connect_attempts.fetch_add(1, Ordering::SeqCst);

        let should_fail = self
            .failing_connects
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(SourceError::Connect("simulated connection failure".to_string()));
        }

        self.open.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(LocalConnection {
            records: Arc::clone(&self.records),
            open: Arc::clone(&self.open),
            fail_reads: self.fail_reads,
        }))
    }
}

struct LocalConnection {
    records: Arc<Vec<TaskRecord>>,
    open: Arc<AtomicUsize>,
    fail_reads: bool,
}

#[async_trait]
impl SourceConnection for LocalConnection {
    async fn fetch_records(&self) -> Result<Vec<TaskRecord>> {
        if self.fail_reads {
            return Err(SourceError::Query("simulated read failure".to_string()));
        }
        debug!(count = self.records.len(), "serving local task records");
        Ok(self.records.as_ref().clone())
    }

    async fn close(self: Box<Self>) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}
