use std::cell::Cell;
use std::fmt::Display;
use std::time::Duration;

use colored::*;
use shapr_core::RunSummary;
use shapr_core::inspect::{InspectEntry, InspectSummary};
use tracing::info;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;

/// Events on this target are printed as-is, without a level marker.
pub const PRINT_TARGET: &str = "shapr::print";

thread_local! {
    pub static GLOBAL_KEY_WIDTH: Cell<usize> = const { Cell::new(0) }
}

#[macro_export]
macro_rules! sprint {
    () => {
        $crate::terminal::print::print("");
    };
    ($msg:expr) => {
        $crate::terminal::print::print($msg);
    };
}

pub trait WithDefaultColor {
    fn with_default(self, default_color: Color) -> ColoredString;
}

impl WithDefaultColor for &str {
    fn with_default(self, default_color: Color) -> ColoredString {
        self.color(default_color)
    }
}

impl WithDefaultColor for String {
    fn with_default(self, default_color: Color) -> ColoredString {
        self.color(default_color)
    }
}

impl WithDefaultColor for ColoredString {
    fn with_default(self, _default_color: Color) -> ColoredString {
        self
    }
}

pub fn print(msg: &str) {
    info!(target: PRINT_TARGET, "{msg}");
}

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right)
    )
    .bright_black();

    print(&format!("{}", line));
}

pub fn fat_separator() {
    let sep: ColoredString = "═".repeat(TOTAL_WIDTH).bright_black();
    print(&format!("{}", sep));
}

/// Sets the key column width used by [`aligned_line`].
pub fn align_keys(keys: &[&str]) {
    let width = keys.iter().map(|k| k.len()).max().unwrap_or(0);
    GLOBAL_KEY_WIDTH.set(width);
}

pub fn aligned_line<V>(key: &str, value: V)
where
    V: Display + WithDefaultColor,
{
    let whitespace: String = ".".repeat((GLOBAL_KEY_WIDTH.get() + 1).saturating_sub(key.len()));
    let colon: String = format!(
        "{}{}",
        whitespace.color(colors::SEPARATOR),
        ":".color(colors::SEPARATOR)
    );
    let value: ColoredString = value.with_default(colors::TEXT_DEFAULT);
    print_status(format!("{}{} {}", key.color(colors::PRIMARY), colon, value));
}

pub fn print_status<T: AsRef<str>>(msg: T) {
    let prefix: ColoredString = ">".color(colors::SEPARATOR);
    let message: String = format!("{} {}", prefix, msg.as_ref().color(colors::TEXT_DEFAULT));
    print(&message);
}

/// Centers plain text, then colours it.
pub fn centerln(msg: &str, color: Color) {
    let space = " ".repeat(TOTAL_WIDTH.saturating_sub(msg.chars().count()) / 2);
    print(&format!("{}{}", space, msg.color(color).bold()));
}

pub fn run_summary(summary: &RunSummary, elapsed: Duration) {
    let line = format!(
        "{} applied, {} skipped, {} failed of {} in {:.2}s",
        summary.applied,
        summary.skipped,
        summary.failed,
        summary.visited,
        elapsed.as_secs_f64()
    );
    let color = if summary.is_success() { colors::PRIMARY } else { colors::FAILED };

    fat_separator();
    centerln(&line, color);
}

pub fn inspect_entry(entry: &InspectEntry) {
    let status: ColoredString = match &entry.current {
        Ok(Some(_)) => "shaped".color(colors::SHAPED),
        Ok(None) => "no profile".color(colors::UNSHAPED),
        Err(e) => format!("error: {e}").color(colors::FAILED),
    };
    aligned_line(&entry.address.to_string(), status);
}

pub fn inspect_summary(summary: &InspectSummary, elapsed: Duration) {
    let line = format!(
        "{} shaped, {} without profile, {} failed of {} in {:.2}s",
        summary.shaped,
        summary.unshaped,
        summary.failed,
        summary.visited,
        elapsed.as_secs_f64()
    );
    let color = if summary.is_success() { colors::PRIMARY } else { colors::FAILED };

    fat_separator();
    centerln(&line, color);
}
