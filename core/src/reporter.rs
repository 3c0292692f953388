//! Sinks for per-address outcomes.
//!
//! The loop never logs on its own. It hands every decision to a [`Reporter`]
//! chosen by the caller, so a run can be audited, printed or asserted on
//! without touching global state.

use shapr_common::network::range::AddressRange;
use tracing::{debug, error, info, warn};

use crate::reconcile::{AddressReport, Outcome, RunSummary};

pub trait Reporter: Send + Sync {
    fn on_start(&self, _range: &AddressRange, _overwrite: bool) {}

    fn on_address(&self, report: &AddressReport);

    fn on_finish(&self, _summary: &RunSummary) {}
}

/// Reports through `tracing`: writes at `info`, untouched addresses at `debug`,
/// failures at `error`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn on_start(&self, range: &AddressRange, overwrite: bool) {
        info!("Applying shaping to {} addresses ({range})", range.len());
        if overwrite {
            warn!("Overwrite is on: existing profiles will be replaced");
        }
    }

    fn on_address(&self, report: &AddressReport) {
        let address = report.address;
        match &report.outcome {
            Outcome::Applied { previous: None } => {
                info!("Shaping {address} with default profile");
            }
            Outcome::Applied { previous: Some(previous) } => {
                info!("Replacing profile on {address} with default profile");
                debug!("Previous parameters for {address}:\n{}", previous.to_pretty_json());
            }
            Outcome::Skipped { current } => {
                debug!(
                    "Profile already set for {address}; parameters follow\n{}",
                    current.to_pretty_json()
                );
            }
            Outcome::Failed { stage, error } => {
                error!("Failed to {stage} shaping for {address}: {error}");
            }
        }
    }

    fn on_finish(&self, summary: &RunSummary) {
        if summary.cancelled {
            warn!(
                "Run cancelled after {} of {} addresses",
                summary.visited, summary.total
            );
        }
        info!(
            "Shaping applied to {} of {} addresses ({} skipped, {} failed)",
            summary.applied, summary.visited, summary.skipped, summary.failed
        );
    }
}
