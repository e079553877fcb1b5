//! Cron scheduler for report runs.
//!
//! Runs the job once on start, then at every upcoming fire time of the cron
//! schedule (UTC) until the shutdown signal flips. Fire times missed while a
//! run was in progress are skipped, not replayed.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{Result, RuntimeError};
use crate::job::ReportJob;

/// Parses a cron expression.
///
/// Accepts the 6/7-field form with seconds and the classic 5-field form,
/// which gets a zero seconds field prepended.
pub fn parse_schedule(expression: &str) -> Result<Schedule> {
    let trimmed = expression.trim();
    let invalid = |reason: String| RuntimeError::InvalidSchedule {
        expression: expression.to_string(),
        reason,
    };

    if trimmed.is_empty() {
        return Err(invalid("expression is empty".to_string()));
    }

    let normalized = if trimmed.split_whitespace().count() == 5 {
        format!("0 {}", trimmed)
    } else {
        trimmed.to_string()
    };

    Schedule::from_str(&normalized).map_err(|e| invalid(e.to_string()))
}

/// Drives a [`ReportJob`] on a cron schedule.
pub struct Scheduler {
    job: Arc<ReportJob>,
    schedule: Schedule,
    shutdown: watch::Receiver<bool>,
}

impl Scheduler {
    /// Creates a scheduler.
    ///
    /// # Errors
    /// Returns [`RuntimeError::InvalidSchedule`] for a bad expression.
    pub fn new(job: Arc<ReportJob>, expression: &str, shutdown: watch::Receiver<bool>) -> Result<Self> {
        Ok(Self {
            job,
            schedule: parse_schedule(expression)?,
            shutdown,
        })
    }

    /// First fire time strictly after `after`.
    pub fn next_fire(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&after).next()
    }

    /// Run the scheduling loop until shutdown signal.
    pub async fn run(&mut self) {
        info!("starting scheduler");
        self.trigger().await;

        let mut cursor = Utc::now();
        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let Some(next) = self.next_fire(cursor) else {
                warn!("schedule has no upcoming fire times");
                break;
            };
            let wait = (next - Utc::now()).to_std().unwrap_or_default();
            info!(next = %next.to_rfc3339(), "next report run scheduled");

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    self.trigger().await;
                    cursor = next.max(Utc::now());
                }
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        debug!("scheduler received shutdown signal");
                        break;
                    }
                }
            }
        }

        info!("scheduler stopped");
    }

    async fn trigger(&self) {
        // Failures are logged and reported as events by the job.
        if let Err(e) = self.job.run().await {
            debug!(error = %e, "scheduled run did not succeed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::event::RunEvent;
    use booked_models::TaskRecord;
    use booked_sheets::MemorySheetStore;
    use booked_source::LocalSource;
    use chrono::TimeZone;
    use std::time::Duration;

    fn job() -> Arc<ReportJob> {
        let source = LocalSource::new(vec![TaskRecord::new("1", 1.0).with_assignee("x@int.example")]);
        let store = MemorySheetStore::new().with_sheet("booked_hours_per_person", 26);
        let config = SyncConfig::new()
            .with_internal_domains(["@int.example"])
            .with_retry(1, Duration::ZERO);
        Arc::new(ReportJob::new(Arc::new(source), Some(Arc::new(store)), &config))
    }

    #[test]
    fn test_five_field_expression() {
        let schedule = parse_schedule("0 17 * * *").unwrap();
        let after = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        let next = schedule.after(&after).next().unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 1, 1, 17, 0, 0).unwrap());

        let next = schedule.after(&next).next().unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 1, 2, 17, 0, 0).unwrap());
    }

    #[test]
    fn test_six_field_expression() {
        let schedule = parse_schedule("30 0 6 * * *").unwrap();
        let after = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let next = schedule.after(&after).next().unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 30).unwrap());
    }

    #[test]
    fn test_invalid_expressions() {
        for bad in ["", "   ", "every day", "61 * * * *"] {
            assert!(
                matches!(parse_schedule(bad), Err(RuntimeError::InvalidSchedule { .. })),
                "{bad:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_eager_run_then_shutdown() {
        let job = job();
        let mut events = job.subscribe();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut scheduler = Scheduler::new(Arc::clone(&job), "0 17 * * *", shutdown_rx).unwrap();
        let handle = tokio::spawn(async move {
            scheduler.run().await;
        });

        loop {
            if let RunEvent::Succeeded { run_id, .. } = events.recv().await.unwrap() {
                assert_eq!(run_id, 1);
                break;
            }
        }

        shutdown_tx.send(true).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(result.is_ok(), "scheduler should stop after shutdown signal");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_on_schedule() {
        let job = job();
        let mut events = job.subscribe();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut scheduler = Scheduler::new(Arc::clone(&job), "* * * * *", shutdown_rx).unwrap();
        let handle = tokio::spawn(async move {
            scheduler.run().await;
        });

        let mut succeeded = 0;
        while succeeded < 3 {
            if let RunEvent::Succeeded { .. } = events.recv().await.unwrap() {
                succeeded += 1;
            }
        }

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
