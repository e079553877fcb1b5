//! Task source traits and the scoped fetch helper.
//!
//! A [`TaskSource`] hands out a [`SourceConnection`]; the connection performs
//! one bulk read and is then closed. [`fetch_all`] wraps the whole sequence so
//! the connection is released on every path, including a failed read.

use std::time::Duration;

use async_trait::async_trait;
use booked_models::TaskRecord;
use tracing::{debug, error, info};

use crate::error::{Result, SourceError};

/// Default number of connection attempts.
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 3;

/// Default pause between connection attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Trait for upstream task record sources.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Short description for logs. Must not contain credentials.
    fn describe(&self) -> String;

    /// Opens a connection.
    ///
    /// Implementations should verify the connection is usable before
    /// returning it.
    async fn connect(&self) -> Result<Box<dyn SourceConnection>>;
}

/// An open connection to a task source.
#[async_trait]
pub trait SourceConnection: Send + Sync {
    /// Reads every task record relevant to the report.
    async fn fetch_records(&self) -> Result<Vec<TaskRecord>>;

    /// Releases the connection.
    async fn close(self: Box<Self>);
}

/// Bounded retry for connection establishment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, at least one.
    pub attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_CONNECT_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy.
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }
}

/// Connects, retrying up to `policy.attempts` times.
///
/// # Errors
/// Returns [`SourceError::Connectivity`] carrying the last failure once all
/// attempts are used up.
pub async fn connect_with_retry(
    source: &dyn TaskSource,
    policy: RetryPolicy,
) -> Result<Box<dyn SourceConnection>> {
    let attempts = policy.attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match source.connect().await {
            Ok(connection) => {
                info!(source = %source.describe(), attempt, "connected to task source");
                return Ok(connection);
            }
            Err(e) => {
                error!(
                    source = %source.describe(),
                    attempt,
                    max_attempts = attempts,
                    error = %e,
                    "task source connection attempt failed"
                );
                last_error = e.to_string();
                if attempt < attempts && !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    Err(SourceError::Connectivity {
        attempts,
        message: last_error,
    })
}

/// Connects, reads all records and closes the connection.
///
/// The connection is closed whether or not the read succeeded.
pub async fn fetch_all(source: &dyn TaskSource, policy: RetryPolicy) -> Result<Vec<TaskRecord>> {
    let connection = connect_with_retry(source, policy).await?;
    let result = connection.fetch_records().await;
    connection.close().await;
    debug!(source = %source.describe(), "task source connection closed");

    let records = result?;
    info!(count = records.len(), "fetched task records");
    Ok(records)
}
