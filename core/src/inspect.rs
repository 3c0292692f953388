//! Read-only pass over a range: what is shaped right now, without writing anything.

use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};

use shapr_common::error::ShapingError;
use shapr_common::network::range::AddressRange;
use shapr_common::profile::ShapingProfile;

use crate::client::ShapingClient;

#[derive(Debug)]
pub struct InspectEntry {
    pub address: IpAddr,
    pub current: Result<Option<ShapingProfile>, ShapingError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectSummary {
    pub total: u128,
    pub visited: u64,
    pub shaped: u64,
    pub unshaped: u64,
    pub failed: u64,
    pub cancelled: bool,
}

impl InspectSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0 && !self.cancelled
    }
}

/// Reads every address of `range` in ascending order and hands each result to `on_entry`.
pub async fn inspect<C, F>(client: &C, range: &AddressRange, stop: &AtomicBool, mut on_entry: F) -> InspectSummary
where
    C: ShapingClient + ?Sized,
    F: FnMut(&InspectEntry),
{
    let mut summary = InspectSummary {
        total: range.len(),
        ..InspectSummary::default()
    };

    for address in range {
        if stop.load(Ordering::Relaxed) {
            summary.cancelled = true;
            break;
        }

        let entry = InspectEntry {
            address,
            current: client.get_shaping(address).await,
        };

        summary.visited += 1;
        match &entry.current {
            Ok(Some(_)) => summary.shaped += 1,
            Ok(None) => summary.unshaped += 1,
            Err(_) => summary.failed += 1,
        }

        on_entry(&entry);
    }

    summary
}
