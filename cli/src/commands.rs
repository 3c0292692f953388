pub mod ensure;
pub mod inspect;

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use shapr_common::error::ShapingError;
use shapr_common::network::range::{self, AddressRange};
use shapr_common::profile::ProfileFormat;

#[derive(Parser)]
#[command(name = "shapr")]
#[command(about = "Keep a default traffic-shaping profile applied across a range of addresses.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// More output; repeat for request-level tracing
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply the default profile to every address without one
    #[command(alias = "e")]
    Ensure {
        #[command(flatten)]
        service: ServiceArgs,

        /// Path to the default profile JSON
        default_profile: PathBuf,

        #[command(flatten)]
        range: RangeArgs,

        /// Apply the profile even if shaping is already in place
        #[arg(long)]
        overwrite: bool,

        /// Format of the profile file
        #[arg(long, default_value_t = ProfileFormat::Named, env = "SHAPR_FORMAT")]
        format: ProfileFormat,

        /// Addresses reconciled at once
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
        jobs: u16,
    },
    /// Show which addresses currently carry a profile
    #[command(alias = "i")]
    Inspect {
        #[command(flatten)]
        service: ServiceArgs,

        #[command(flatten)]
        range: RangeArgs,
    },
}

#[derive(Args)]
pub struct ServiceArgs {
    /// Shaping service host, e.g. localhost:8000
    pub api_host: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30, value_name = "SECS", env = "SHAPR_TIMEOUT")]
    pub timeout: u64,
}

#[derive(Args)]
pub struct RangeArgs {
    /// Bottom of the address range, e.g. 10.0.0.10
    pub ip_min: IpAddr,

    /// Top of the address range, e.g. 10.0.0.50 (or just 50)
    pub ip_max: String,
}

impl RangeArgs {
    pub fn to_range(&self) -> Result<AddressRange, ShapingError> {
        let max = range::parse_upper_bound(&self.ip_max, self.ip_min)?;
        AddressRange::new(self.ip_min, max)
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
