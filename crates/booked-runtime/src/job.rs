//! One report run: read, compute, publish.
//!
//! A run fetches every task record, builds the detail and summary tables, and
//! writes both sheets concurrently. Runs never overlap: a trigger that arrives
//! while a run is in flight is rejected with [`RuntimeError::AlreadyRunning`].
//!
//! In dry-run mode each run writes to a fresh [`DryRunStore`] instead of the
//! live store. The live store, when configured, only answers sheet lookups.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};

use booked_core::{build_report, ClassificationPolicy};
use booked_sheets::{
    DryRunStore, GoogleSheetsStore, Reconciler, ServiceAccountKey, SheetTarget, TabularStore,
    WriteOutcome,
};
use booked_source::{fetch_all, MongoSource, RetryPolicy, TaskSource};

use crate::config::{ConfigError, GoogleConfig, MongoConfig, SyncConfig};
use crate::error::{Result, RuntimeError};
use crate::event::RunEvent;

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Run number, starting at 1.
    pub run_id: u64,
    /// Task records read.
    pub records: usize,
    /// Projects reported.
    pub projects: usize,
    /// Detail table width.
    pub columns: usize,
    /// Detail sheet write.
    pub detail: WriteOutcome,
    /// Summary sheet write.
    pub summary: WriteOutcome,
    /// Whether the run wrote to the dry-run sink.
    pub dry_run: bool,
    /// Start time.
    pub started_at: DateTime<Utc>,
    /// Wall time taken.
    pub duration: Duration,
}

/// Builds the MongoDB source for `config`.
pub fn mongo_source(config: &MongoConfig) -> Result<MongoSource> {
    Ok(MongoSource::new(
        &config.uri,
        &config.database,
        &config.collection,
    )?)
}

/// Builds the Google Sheets store for `config`.
pub fn google_store(config: &GoogleConfig) -> Result<GoogleSheetsStore> {
    let key = ServiceAccountKey::new(&config.client_email, &config.private_key)?;
    Ok(GoogleSheetsStore::new(&config.file_id, key)?)
}

/// The report job.
pub struct ReportJob {
    source: Arc<dyn TaskSource>,
    store: Option<Arc<dyn TabularStore>>,
    policy: ClassificationPolicy,
    retry: RetryPolicy,
    detail: SheetTarget,
    summary: SheetTarget,
    batch_size: usize,
    dry_run: bool,
    running: AtomicBool,
    runs: AtomicU64,
    last_dry_run: Mutex<Option<Arc<DryRunStore>>>,
    event_tx: broadcast::Sender<RunEvent>,
}

impl ReportJob {
    /// Creates a job reading from `source` and writing to `store`.
    ///
    /// `store` may be `None` only in dry-run mode. In dry-run mode a present
    /// `store` is used for sheet lookups only.
    pub fn new(
        source: Arc<dyn TaskSource>,
        store: Option<Arc<dyn TabularStore>>,
        config: &SyncConfig,
    ) -> Self {
        let policy = config.classification_policy();
        if policy.internal_suffixes().is_empty() {
            warn!("no internal domains configured; every assigned hour counts as external");
        }

        let (event_tx, _) = broadcast::channel(64);

        Self {
            source,
            store,
            policy,
            retry: config.retry_policy(),
            detail: config.detail_target(),
            summary: config.summary_target(),
            batch_size: config.batch_size,
            dry_run: config.dry_run,
            running: AtomicBool::new(false),
            runs: AtomicU64::new(0),
            last_dry_run: Mutex::new(None),
            event_tx,
        }
    }

    /// Creates a job reading from `source`, with the live store taken from
    /// `config`. Dry runs without Google settings get no live store.
    pub fn with_source(source: Arc<dyn TaskSource>, config: &SyncConfig) -> Result<Self> {
        config.validate()?;

        let store: Option<Arc<dyn TabularStore>> = match &config.google {
            Some(google) => Some(Arc::new(google_store(google)?)),
            None if config.dry_run => None,
            None => return Err(ConfigError::Missing("GOOGLE_FILE_ID".to_string()).into()),
        };

        Ok(Self::new(source, store, config))
    }

    /// Creates a job for the MongoDB source and Google store in `config`.
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        let source = mongo_source(config.require_mongo()?)?;
        Self::with_source(Arc::new(source), config)
    }

    /// Subscribes to run events.
    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.event_tx.subscribe()
    }

    /// Returns true while a run is in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Returns true if runs write to the dry-run sink.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Dry-run sink used by the most recent dry run.
    pub async fn last_dry_run(&self) -> Option<Arc<DryRunStore>> {
        self.last_dry_run.lock().await.clone()
    }

    fn emit(&self, event: RunEvent) {
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }

    /// Performs one run.
    ///
    /// # Errors
    /// Returns [`RuntimeError::AlreadyRunning`] without doing anything if a
    /// run is in flight. Any other error ends this run only.
    pub async fn run(&self) -> Result<RunSummary> {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            warn!("report run already in progress; skipping trigger");
            self.emit(RunEvent::Skipped { at: Utc::now() });
            return Err(RuntimeError::AlreadyRunning);
        };

        let run_id = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        let started_at = Utc::now();
        info!(
            run_id,
            started_at = %started_at.to_rfc3339(),
            dry_run = self.dry_run,
            source = %self.source.describe(),
            "report run started"
        );
        self.emit(RunEvent::Started {
            run_id,
            at: started_at,
            dry_run: self.dry_run,
        });

        let clock = Instant::now();
        match self.execute(run_id, started_at, clock).await {
            Ok(summary) => {
                info!(
                    run_id,
                    finished_at = %Utc::now().to_rfc3339(),
                    projects = summary.projects,
                    columns = summary.columns,
                    duration_ms = summary.duration.as_millis() as u64,
                    "report run finished"
                );
                self.emit(RunEvent::Succeeded {
                    run_id,
                    summary: summary.clone(),
                });
                Ok(summary)
            }
            Err(e) => {
                error!(
                    run_id,
                    finished_at = %Utc::now().to_rfc3339(),
                    error = %e,
                    "report run failed"
                );
                self.emit(RunEvent::Failed {
                    run_id,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        run_id: u64,
        started_at: DateTime<Utc>,
        clock: Instant,
    ) -> Result<RunSummary> {
        let records = fetch_all(self.source.as_ref(), self.retry).await?;

        let report = build_report(&records, &self.policy)?;
        let detail_table = report.detail_table()?;
        let summary_table = report.summary_table();
        info!(
            run_id,
            records = records.len(),
            projects = report.detail.len(),
            assignees = report.schema.assignees().len(),
            "report computed"
        );

        let sink;
        let store: &dyn TabularStore = if self.dry_run {
            sink = Arc::new(match &self.store {
                Some(live) => DryRunStore::with_lookup(Arc::clone(live)),
                None => DryRunStore::new(),
            });
            *self.last_dry_run.lock().await = Some(Arc::clone(&sink));
            sink.as_ref()
        } else {
            self.store
                .as_deref()
                .ok_or_else(|| ConfigError::Missing("GOOGLE_FILE_ID".to_string()))?
        };

        let reconciler = Reconciler::new(store, self.batch_size);
        let (detail, summary) = tokio::join!(
            reconciler.replace(&self.detail, &detail_table),
            reconciler.replace(&self.summary, &summary_table),
        );

        let (detail, summary) = match (detail, summary) {
            (Ok(detail), Ok(summary)) => (detail, summary),
            (detail, summary) => {
                let mut failures = Vec::new();
                for result in [detail, summary] {
                    match result {
                        Ok(outcome) => {
                            info!(run_id, title = %outcome.title, "sheet written despite other failure")
                        }
                        Err(e) => {
                            error!(run_id, resource = %e.resource, step = %e.step, error = %e.source, "sheet write failed");
                            failures.push(e);
                        }
                    }
                }
                return Err(RuntimeError::Write(failures));
            }
        };

        Ok(RunSummary {
            run_id,
            records: records.len(),
            projects: report.detail.len(),
            columns: detail_table.width(),
            detail,
            summary,
            dry_run: self.dry_run,
            started_at,
            duration: clock.elapsed(),
        })
    }
}

/// Holds the in-flight flag for the duration of a run.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
