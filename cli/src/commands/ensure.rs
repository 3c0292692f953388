use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use anyhow::Context;
use shapr_common::config::Config;
use shapr_common::network::range::AddressRange;
use shapr_common::profile::{ProfileFormat, ShapingProfile};
use shapr_core::{ClientConfig, HttpShapingClient, Reconciler, TracingReporter};

use crate::sprint;
use crate::terminal::print;

pub async fn ensure(
    cfg: &Config,
    profile_path: &Path,
    range: &AddressRange,
    stop: &AtomicBool,
) -> anyhow::Result<()> {
    let default_profile = load_profile(profile_path, cfg.format)?;
    let client = HttpShapingClient::new(&ClientConfig::new(&cfg.api_host).with_timeout(cfg.timeout))?;

    print_plan(cfg, client.base_url(), profile_path, range);

    let reconciler = Reconciler::new(client, default_profile)
        .overwrite(cfg.overwrite)
        .concurrency(cfg.jobs);

    let start_time = Instant::now();
    let summary = reconciler.run(range, &TracingReporter, stop).await;
    print::run_summary(&summary, start_time.elapsed());

    if summary.cancelled {
        anyhow::bail!(
            "interrupted after {} of {} addresses",
            summary.visited,
            summary.total
        );
    }
    if summary.failed > 0 {
        anyhow::bail!(
            "{} of {} addresses could not be reconciled",
            summary.failed,
            summary.visited
        );
    }
    Ok(())
}

/// Reads and validates the default profile. Any problem here is fatal: there
/// is nothing to apply without it.
pub fn load_profile(path: &Path, format: ProfileFormat) -> anyhow::Result<ShapingProfile> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read default profile {}", path.display()))?;

    let profile = ShapingProfile::from_slice(&bytes, format)
        .with_context(|| format!("default profile {} ({format} format) is not usable", path.display()))?;

    Ok(profile)
}

fn print_plan(cfg: &Config, base_url: &str, profile_path: &Path, range: &AddressRange) {
    print::align_keys(&["Service", "Range", "Profile", "Overwrite", "Jobs"]);
    print::aligned_line("Service", base_url);
    print::aligned_line("Range", format!("{range} ({} addresses)", range.len()));
    print::aligned_line("Profile", format!("{} ({})", profile_path.display(), cfg.format));
    print::aligned_line("Overwrite", if cfg.overwrite { "yes" } else { "no" });
    print::aligned_line("Jobs", cfg.jobs.to_string());
    sprint!();
}
