//! booked-hours binary.
//!
//! Run once and exit:
//! ```bash
//! cargo run -p booked-hours -- --once
//! ```
//!
//! Or stay up and publish on the configured schedule (default: daily 17:00
//! UTC), with one run right away.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use booked_core::config;
use booked_runtime::{mongo_source, ReportJob, Runtime, SyncConfig};
use booked_source::{LocalSource, TaskSource};

/// Booked hours report - aggregate task hours and publish them to Google Sheets
#[derive(Parser, Debug)]
#[command(name = "booked-hours")]
#[command(about = "Publish booked hours per project and person to Google Sheets")]
struct Args {
    /// Run a single report and exit
    #[arg(long)]
    once: bool,

    /// Compute and log the report without writing to the spreadsheet
    #[arg(long)]
    dry_run: bool,

    /// Cron schedule, overrides SYNC_SCHEDULE
    #[arg(long)]
    schedule: Option<String>,

    /// Read task records from a JSON file instead of MongoDB
    #[arg(long, value_name = "FILE")]
    records: Option<PathBuf>,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load env files before reading any configuration
    let loaded = config::load_env_files();

    let filter = match args.verbose {
        0 => "booked_hours=info,booked_runtime=info,booked_sheets=warn,booked_source=warn",
        1 => "booked_hours=debug,booked_runtime=debug,booked_sheets=info,booked_source=info",
        2 => "booked_hours=trace,booked_runtime=trace,booked_sheets=debug,booked_source=debug,booked_core=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(filter))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    for path in &loaded {
        tracing::debug!(path = %path.display(), "loaded env file");
    }

    let mut sync_config = SyncConfig::from_env()?;
    if args.dry_run {
        sync_config = sync_config.with_dry_run(true);
    }
    if let Some(schedule) = args.schedule {
        sync_config = sync_config.with_schedule(schedule);
    }

    let source: Arc<dyn TaskSource> = match &args.records {
        Some(path) => Arc::new(LocalSource::from_file(path)?),
        None => Arc::new(mongo_source(sync_config.require_mongo()?)?),
    };

    let job = Arc::new(ReportJob::with_source(source, &sync_config)?);

    if args.once {
        let summary = job.run().await?;
        println!(
            "Wrote {} projects ({} columns) to {} and {}{}",
            summary.projects,
            summary.columns,
            summary.detail.title,
            summary.summary.title,
            if summary.dry_run { " [dry run]" } else { "" }
        );
        return Ok(());
    }

    let dry_run = job.is_dry_run();
    let mut runtime = Runtime::new(job, &sync_config.schedule)?;
    runtime.start().await?;

    println!(
        "booked-hours running on schedule \"{}\"{}",
        sync_config.schedule,
        if dry_run { " [dry run]" } else { "" }
    );
    println!("   Press Ctrl+C to stop\n");

    tokio::signal::ctrl_c().await?;
    if runtime.job().is_running() {
        println!("Waiting for the current run to finish...");
    }
    runtime.shutdown().await?;

    Ok(())
}
