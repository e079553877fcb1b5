//! Core data models for booked-hours.
//!
//! This crate provides the fundamental data types shared by the report
//! engine, the upstream data source and the spreadsheet writer: raw task
//! records, per-project aggregates, the report schema and the rendered
//! tables.

pub mod record;
pub mod report;
pub mod table;

// Re-export main types
pub use record::{ProjectHoursAggregate, TaskRecord, UNASSIGNED_KEY};
pub use report::{
    Bucket, DetailRow, ReportSchema, SummaryRow, PROJECT_ID_COLUMN, PROJECT_NAME_COLUMN,
    SUMMARY_HEADER,
};
pub use table::{Cell, Table};
