mod commands;
mod terminal;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use commands::{CommandLine, Commands, ensure, inspect};
use shapr_common::config::Config;
use terminal::{logging, print};
use tracing::warn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose, commands.quiet);
    let stop = stop_on_interrupt();

    match commands.command {
        Commands::Ensure {
            service,
            default_profile,
            range,
            overwrite,
            format,
            jobs,
        } => {
            let range = range.to_range()?;
            let cfg = Config {
                api_host: service.api_host,
                overwrite,
                format,
                timeout: Duration::from_secs(service.timeout),
                jobs: usize::from(jobs),
            };

            print::header("ensuring default shaping");
            ensure::ensure(&cfg, &default_profile, &range, &stop).await
        }
        Commands::Inspect { service, range } => {
            let range = range.to_range()?;
            let cfg = Config {
                api_host: service.api_host,
                timeout: Duration::from_secs(service.timeout),
                ..Config::default()
            };

            print::header("inspecting shaping");
            inspect::inspect(&cfg, &range, &stop).await
        }
    }
}

/// The loop checks this flag between addresses; Ctrl-C lets in-flight ones finish.
fn stop_on_interrupt() -> Arc<AtomicBool> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing addresses in flight");
            flag.store(true, Ordering::Relaxed);
        }
    });

    stop
}
