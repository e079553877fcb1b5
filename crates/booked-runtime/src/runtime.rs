//! Main runtime manager.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{Result, RuntimeError};
use crate::event::RunEvent;
use crate::job::ReportJob;
use crate::scheduler::{parse_schedule, Scheduler};

/// Runs a report job on a schedule in the background.
pub struct Runtime {
    /// The job being scheduled.
    job: Arc<ReportJob>,
    /// Cron expression.
    schedule: String,
    /// Handle to the scheduler task.
    scheduler_handle: Option<JoinHandle<()>>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver (for cloning to the scheduler).
    shutdown_rx: watch::Receiver<bool>,
    /// Whether the runtime has been started.
    started: bool,
}

impl Runtime {
    /// Create a new runtime.
    ///
    /// # Errors
    /// Returns [`RuntimeError::InvalidSchedule`] for a bad expression.
    pub fn new(job: Arc<ReportJob>, schedule: impl Into<String>) -> Result<Self> {
        let schedule = schedule.into();
        parse_schedule(&schedule)?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            job,
            schedule,
            scheduler_handle: None,
            shutdown_tx,
            shutdown_rx,
            started: false,
        })
    }

    /// Start the runtime (runs once immediately, then on schedule).
    pub async fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(RuntimeError::AlreadyStarted);
        }

        info!(schedule = %self.schedule, "starting runtime");

        let mut scheduler = Scheduler::new(
            Arc::clone(&self.job),
            &self.schedule,
            self.shutdown_rx.clone(),
        )?;

        let handle = tokio::spawn(async move {
            scheduler.run().await;
        });

        self.scheduler_handle = Some(handle);
        self.started = true;

        debug!("runtime started");

        Ok(())
    }

    /// Stop the runtime gracefully.
    ///
    /// A run in progress is allowed to finish first.
    pub async fn shutdown(&mut self) -> Result<()> {
        if !self.started {
            return Err(RuntimeError::NotStarted);
        }

        info!("shutting down runtime");

        self.shutdown_tx.send(true).map_err(|e| {
            RuntimeError::Shutdown(format!("failed to send shutdown signal: {}", e))
        })?;

        if let Some(handle) = self.scheduler_handle.take() {
            debug!("waiting for scheduler to stop");
            handle.await.map_err(|e| {
                RuntimeError::Shutdown(format!("scheduler task panicked: {}", e))
            })?;
        }

        self.started = false;

        info!("runtime stopped");

        Ok(())
    }

    /// Get the scheduled job.
    pub fn job(&self) -> Arc<ReportJob> {
        Arc::clone(&self.job)
    }

    /// Subscribe to run events.
    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.job.subscribe()
    }

    /// Check if the runtime has been started.
    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        // Send shutdown signal if still running
        if self.started {
            let _ = self.shutdown_tx.send(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use booked_models::TaskRecord;
    use booked_sheets::MemorySheetStore;
    use booked_source::LocalSource;
    use std::time::Duration;

    fn job() -> Arc<ReportJob> {
        let source = LocalSource::new(vec![TaskRecord::new("7", 2.0)]);
        let config = SyncConfig::new().with_dry_run(true).with_retry(1, Duration::ZERO);
        Arc::new(ReportJob::new(Arc::new(source), None, &config))
    }

    #[test]
    fn test_runtime_rejects_bad_schedule() {
        let result = Runtime::new(job(), "not a schedule");
        assert!(matches!(result, Err(RuntimeError::InvalidSchedule { .. })));
    }

    #[tokio::test]
    async fn test_runtime_start_stop() {
        let mut runtime = Runtime::new(job(), "0 17 * * *").unwrap();
        let mut events = runtime.subscribe();

        runtime.start().await.unwrap();
        assert!(runtime.is_started());

        // Eager run on start
        let event = events.recv().await.unwrap();
        assert!(matches!(event, RunEvent::Started { run_id: 1, dry_run: true, .. }));

        runtime.shutdown().await.unwrap();
        assert!(!runtime.is_started());
    }

    #[tokio::test]
    async fn test_runtime_double_start() {
        let mut runtime = Runtime::new(job(), "0 17 * * *").unwrap();

        runtime.start().await.unwrap();

        let result = runtime.start().await;
        assert!(matches!(result, Err(RuntimeError::AlreadyStarted)));

        runtime.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_runtime_shutdown_not_started() {
        let mut runtime = Runtime::new(job(), "0 17 * * *").unwrap();

        let result = runtime.shutdown().await;
        assert!(matches!(result, Err(RuntimeError::NotStarted)));
    }

    #[tokio::test]
    async fn test_runtime_job_access() {
        let runtime = Runtime::new(job(), "0 17 * * *").unwrap();
        assert!(runtime.job().is_dry_run());
        assert!(!runtime.job().is_running());
    }
}
