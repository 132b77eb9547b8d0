//! Terminal output for status updates and per-item reports.

use tabi_core::reconcile::{ItemOutcome, ReconcileReport};
use tabi_core::{Status, StatusKind, StatusSink};

/// Prints progress and errors to stderr and the success message to stdout,
/// so `tabi run ... > out` captures only the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleStatus;

impl StatusSink for ConsoleStatus {
    fn publish(&self, status: &Status) {
        match status.kind {
            StatusKind::Progress => eprintln!("{}", status.message),
            StatusKind::Success => println!("{}", status.message),
            StatusKind::Error => eprintln!("error: {}", status.message),
        }
    }
}

/// List skipped and failed items. Nothing is printed for a clean run.
pub fn print_report(report: &ReconcileReport) {
    for item in &report.items {
        match &item.outcome {
            ItemOutcome::Applied => {}
            ItemOutcome::Skipped { reason } => eprintln!("  skipped {}: {reason}", item.item),
            ItemOutcome::Failed { error } => eprintln!("  failed {}: {error}", item.item),
        }
    }
}
