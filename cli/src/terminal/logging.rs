use colored::*;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::registry::LookupSpan;

use crate::terminal::print::PRINT_TARGET;

/// Crates of the HTTP stack, kept one level quieter than the tool itself.
const HTTP_CRATES: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls"];

pub struct ShaprFormatter;

impl<S, N> FormatEvent<S, N> for ShaprFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        if meta.target() != PRINT_TARGET {
            let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) = match *meta.level() {
                Level::TRACE => ("[ ]", |s| s.dimmed()),
                Level::DEBUG => ("[?]", |s| s.blue()),
                Level::INFO => ("[+]", |s| s.green().bold()),
                Level::WARN => ("[*]", |s| s.yellow().bold()),
                Level::ERROR => ("[-]", |s| s.red().bold()),
            };

            write!(writer, "{} ", color_func(symbol.into()))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Maps `-v`/`-q` to a level. `RUST_LOG`, when set, wins.
pub fn init_logging(verbose: u8, quiet: bool) {
    let (level, http_level) = match (quiet, verbose) {
        (true, _) => (Level::WARN, Level::ERROR),
        (false, 0) => (Level::INFO, Level::WARN),
        (false, 1) => (Level::DEBUG, Level::INFO),
        (false, _) => (Level::TRACE, Level::DEBUG),
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives: Vec<String> = std::iter::once(level.to_string().to_lowercase())
            .chain(
                HTTP_CRATES
                    .iter()
                    .map(|krate| format!("{krate}={}", http_level.to_string().to_lowercase())),
            )
            .collect();
        EnvFilter::new(directives.join(","))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(ShaprFormatter)
        .init();
}
