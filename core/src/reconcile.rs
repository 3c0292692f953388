//! The convergence loop.
//!
//! For every address of a range, in ascending order, the [`Reconciler`] reads
//! the current profile and applies the default one when
//!
//! * no profile is set (gap filling), or
//! * `overwrite` is on (forced convergence).
//!
//! Anything else is left untouched, so re-running with `overwrite` off never
//! writes to an address that already carries *any* profile. Failures are
//! reported against their address and the loop moves on; nothing is retried.
//! Re-running the whole loop is the retry.

use std::fmt;
use std::net::IpAddr;
use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::{StreamExt, future, stream};
use shapr_common::error::ShapingError;
use shapr_common::network::range::AddressRange;
use shapr_common::profile::ShapingProfile;

use crate::client::ShapingClient;
use crate::reporter::Reporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Apply,
    Skip,
}

/// The idempotence rule: fill gaps always, replace only when forced.
pub fn decide(current: Option<&ShapingProfile>, overwrite: bool) -> Decision {
    if overwrite || current.is_none() {
        Decision::Apply
    } else {
        Decision::Skip
    }
}

/// Which of the two requests for an address failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Read => f.write_str("read"),
            Stage::Write => f.write_str("write"),
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    /// The default profile was written. `previous` is what it replaced, if anything.
    Applied { previous: Option<ShapingProfile> },
    /// A profile was already set and `overwrite` is off.
    Skipped { current: ShapingProfile },
    Failed { stage: Stage, error: ShapingError },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

#[derive(Debug)]
pub struct AddressReport {
    pub address: IpAddr,
    pub outcome: Outcome,
}

/// Aggregate result of one pass over a range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Addresses in the requested range.
    pub total: u128,
    /// Addresses actually processed; lower than `total` only when cancelled.
    pub visited: u64,
    pub applied: u64,
    pub skipped: u64,
    pub failed: u64,
    pub cancelled: bool,
}

impl RunSummary {
    fn new(total: u128) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    fn record(&mut self, outcome: &Outcome) {
        self.visited += 1;
        match outcome {
            Outcome::Applied { .. } => self.applied += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
    }

    /// A run succeeds only if every address was attempted and none failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && !self.cancelled
    }
}

pub struct Reconciler<C> {
    client: C,
    default_profile: ShapingProfile,
    overwrite: bool,
    concurrency: usize,
}

impl<C: ShapingClient> Reconciler<C> {
    pub fn new(client: C, default_profile: ShapingProfile) -> Self {
        Self {
            client,
            default_profile,
            overwrite: false,
            concurrency: 1,
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Number of addresses allowed in flight at once. `0` is treated as `1`.
    pub fn concurrency(mut self, jobs: usize) -> Self {
        self.concurrency = jobs.max(1);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn default_profile(&self) -> &ShapingProfile {
        &self.default_profile
    }

    /// Get, decide and, if needed, set the profile of one address.
    pub async fn reconcile_address(&self, addr: IpAddr) -> Outcome {
        let current = match self.client.get_shaping(addr).await {
            Ok(current) => current,
            Err(error) => {
                return Outcome::Failed {
                    stage: Stage::Read,
                    error,
                };
            }
        };

        match (decide(current.as_ref(), self.overwrite), current) {
            (Decision::Skip, Some(current)) => Outcome::Skipped { current },
            (_, previous) => match self.client.set_shaping(addr, &self.default_profile).await {
                Ok(()) => Outcome::Applied { previous },
                Err(error) => Outcome::Failed {
                    stage: Stage::Write,
                    error,
                },
            },
        }
    }

    /// Validates `min..=max` and runs the loop over it.
    ///
    /// # Errors
    /// [`ShapingError::InvalidRange`] before any request is made.
    pub async fn reconcile(
        &self,
        min: IpAddr,
        max: IpAddr,
        reporter: &dyn Reporter,
        stop: &AtomicBool,
    ) -> Result<RunSummary, ShapingError> {
        let range = AddressRange::new(min, max)?;
        Ok(self.run(&range, reporter, stop).await)
    }

    /// Reconciles every address of `range`.
    ///
    /// `stop` is checked before each address is started; once set, addresses
    /// already in flight finish and the summary is marked cancelled. Reports
    /// reach `reporter` in ascending address order whatever the concurrency.
    pub async fn run(&self, range: &AddressRange, reporter: &dyn Reporter, stop: &AtomicBool) -> RunSummary {
        reporter.on_start(range, self.overwrite);

        let mut summary = RunSummary::new(range.len());
        let mut reports = pin!(stream::iter(range.iter())
            .take_while(|_| future::ready(!stop.load(Ordering::Relaxed)))
            .map(move |address| async move {
                AddressReport {
                    address,
                    outcome: self.reconcile_address(address).await,
                }
            })
            .buffered(self.concurrency));

        while let Some(report) = reports.next().await {
            summary.record(&report.outcome);
            reporter.on_address(&report);
        }

        summary.cancelled = u128::from(summary.visited) < summary.total;
        reporter.on_finish(&summary);
        summary
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
