//! Result export and run summary
//!
//! The pipeline's obligation downstream is a stable column set; the CSV
//! writer here is the reference exporter. The run summary prints what the
//! report collected, in the spirit of a post-run statistics dump.

mod csv;

pub use csv::{export_csv, CSV_COLUMNS};

use crate::report::{FailureKind, RunReport};
use thiserror::Error;

/// Errors that can occur while writing results
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// Prints a human-readable summary of the run's diagnostics
pub fn print_run_summary(report: &RunReport, exported: usize) {
    println!("\n=== Run Summary ===");
    println!("Records exported:     {}", exported);
    println!(
        "Transport failures:   {}",
        report.count_by_kind(FailureKind::Transport)
    );
    println!(
        "Parse failures:       {}",
        report.count_by_kind(FailureKind::Parse)
    );
    println!(
        "Block signals:        {}",
        report.count_by_kind(FailureKind::Blocked)
    );

    let excluded = report.excluded_domains();
    println!("Excluded domains:     {}", excluded.len());
    for domain in &excluded {
        println!("  - {}", domain);
    }

    let failures = report.failures();
    if !failures.is_empty() {
        println!("\nRecorded failures:");
        for failure in failures.iter().take(20) {
            println!(
                "  [{}/{}] {} - {}",
                failure.stage, failure.kind, failure.url, failure.reason
            );
        }
        if failures.len() > 20 {
            println!("  ... and {} more", failures.len() - 20);
        }
    }
}
