use std::sync::atomic::AtomicBool;
use std::time::Instant;

use shapr_common::config::Config;
use shapr_common::network::range::AddressRange;
use shapr_core::inspect;
use shapr_core::{ClientConfig, HttpShapingClient};
use tracing::debug;

use crate::terminal::print;

pub async fn inspect(cfg: &Config, range: &AddressRange, stop: &AtomicBool) -> anyhow::Result<()> {
    let client = HttpShapingClient::new(&ClientConfig::new(&cfg.api_host).with_timeout(cfg.timeout))?;

    let (min, max) = (range.min().to_string(), range.max().to_string());
    print::align_keys(&[min.as_str(), max.as_str()]);

    let start_time = Instant::now();
    let summary = inspect::inspect(&client, range, stop, |entry| {
        print::inspect_entry(entry);
        if let Ok(Some(profile)) = &entry.current {
            debug!("Parameters for {}:\n{}", entry.address, profile.to_pretty_json());
        }
    })
    .await;
    print::inspect_summary(&summary, start_time.elapsed());

    if summary.cancelled {
        anyhow::bail!("interrupted after {} of {} addresses", summary.visited, summary.total);
    }
    if summary.failed > 0 {
        anyhow::bail!("{} of {} addresses could not be read", summary.failed, summary.visited);
    }
    Ok(())
}
