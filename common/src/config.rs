use std::time::Duration;

use crate::profile::ProfileFormat;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Config {
    /// Shaping service host, e.g. `localhost:8000`.
    pub api_host: String,

    /// Replace profiles that are already set instead of only filling gaps.
    pub overwrite: bool,

    /// Encoding of the default profile file.
    pub format: ProfileFormat,

    /// Upper bound for every single HTTP request.
    pub timeout: Duration,

    /// How many addresses may be reconciled at once.
    ///
    /// Reports are still emitted in ascending address order.
    pub jobs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_host: String::new(),
            overwrite: false,
            format: ProfileFormat::default(),
            timeout: DEFAULT_TIMEOUT,
            jobs: 1,
        }
    }
}
