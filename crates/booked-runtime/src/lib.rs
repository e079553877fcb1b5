//! Report runs and scheduling for booked-hours.
//!
//! This crate wires the engine, the task source and the spreadsheet store
//! together:
//! - `SyncConfig` - settings read from the environment
//! - `ReportJob` - one run: fetch, compute, write both sheets
//! - `Scheduler` - eager first run, then cron-driven runs
//! - `Runtime` - starts the scheduler in the background and stops it
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use booked_runtime::{ReportJob, Runtime, SyncConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SyncConfig::from_env()?;
//!     let job = Arc::new(ReportJob::from_config(&config)?);
//!
//!     let mut events = job.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let mut runtime = Runtime::new(job, &config.schedule)?;
//!     runtime.start().await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     runtime.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Runs
//!
//! A run is sequential up to the writes: records are fetched (the connection
//! is released before anything else happens), aggregated, ordered and
//! classified. The detail and summary sheets are then written concurrently.
//! A failure writing one sheet does not stop the other, but the run as a
//! whole fails. Runs never overlap.

pub mod config;
pub mod error;
pub mod event;
pub mod job;
pub mod runtime;
pub mod scheduler;

pub use config::{
    ConfigError, GoogleConfig, MongoConfig, SyncConfig, DEFAULT_DETAIL_TITLE, DEFAULT_SCHEDULE,
    DEFAULT_SUMMARY_TITLE,
};
pub use error::{Result, RuntimeError};
pub use event::RunEvent;
pub use job::{google_store, mongo_source, ReportJob, RunSummary};
pub use runtime::Runtime;
pub use scheduler::{parse_schedule, Scheduler};
