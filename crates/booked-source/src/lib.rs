//! Upstream task record sources.
//!
//! The report engine needs one thing from upstream: every task record, read
//! in bulk. This crate provides that read behind the [`TaskSource`] trait:
//!
//! - **MongoSource**: the `tasks` collection of a MongoDB database
//! - **LocalSource**: a fixed record set, in code or from a JSON file
//!
//! [`fetch_all`] is the entry point used by the runtime. It connects with
//! bounded retry, reads, and always closes the connection afterwards.
//!
//! # Example
//!
//! ```no_run
//! use booked_source::{fetch_all, MongoSource, RetryPolicy, DEFAULT_COLLECTION};
//!
//! # async fn example() -> booked_source::Result<()> {
//! let source = MongoSource::new("mongodb://localhost:27017", "reports", DEFAULT_COLLECTION)?;
//! let records = fetch_all(&source, RetryPolicy::default()).await?;
//! println!("{} records", records.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod local;
pub mod mongo;
pub mod source;

pub use error::{Result, SourceError};
pub use local::LocalSource;
pub use mongo::{record_from_document, MongoSource, DEFAULT_COLLECTION};
pub use source::{
    connect_with_retry, fetch_all, RetryPolicy, SourceConnection, TaskSource,
    DEFAULT_CONNECT_ATTEMPTS, DEFAULT_RETRY_DELAY,
};
