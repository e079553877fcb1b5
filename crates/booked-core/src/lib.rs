//! booked-core - the report engine.
//!
//! Turns a flat set of task records into two aligned tables:
//!
//! - **aggregate**: fold records into per-project assignee → hours maps
//! - **schema**: derive the detail header from the union of assignee keys
//! - **normalize**: render complete detail rows in canonical project order
//! - **classify**: bucket hours into internal / external / unassigned
//! - **sum**: order-independent hour sums
//! - **report**: run the whole pipeline and render [`booked_models::Table`]s
//! - **config**: state directory and env file loading
//!
//! The engine is pure: no I/O, no clocks, no globals. The same records and
//! policy always produce the same report.
//!
//! # Example
//!
//! ```
//! use booked_core::{build_report, ClassificationPolicy};
//! use booked_models::TaskRecord;
//!
//! let records = vec![
//!     TaskRecord::new("1", 3.0).with_assignee("x@int.example"),
//!     TaskRecord::new("1", 2.0),
//!     TaskRecord::new("2", 5.0).with_assignee("y@ext.example"),
//! ];
//! let policy = ClassificationPolicy::new(["@int.example"]);
//! let report = build_report(&records, &policy).unwrap();
//!
//! assert_eq!(report.summary[0].total_hours, 5.0);
//! assert_eq!(report.summary[1].external, 5.0);
//! ```

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod error;
pub mod normalize;
pub mod ordering;
pub mod report;
pub mod schema;
pub mod sum;

pub use aggregate::{aggregate_records, Aggregates};
pub use classify::{ClassificationPolicy, NO_ASSIGNEE_SPELLINGS};
pub use config::{env_file, load_env_files, state_dir};
pub use error::{ReportError, Result};
pub use normalize::normalize_rows;
pub use ordering::{compare_project_ids, format_project_id, format_project_name, is_numeric_id};
pub use report::{build_report, Report};
pub use schema::build_schema;
pub use sum::stable_sum;
