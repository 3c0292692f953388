//! Access to the remote shaping-control service.
//!
//! [`ShapingClient`] is the port the reconciliation loop depends on. The only
//! production implementation is [`HttpShapingClient`], which speaks the
//! service's per-address REST resource:
//!
//! * `GET  /api/v1/shape/{addr}/` returns the raw parameters (200) or nothing (404).
//! * `POST /api/v1/shape/{addr}/` sets them, with `X-Real-IP: {addr}` naming the
//!   address the write is made on behalf of.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use shapr_common::config::DEFAULT_TIMEOUT;
use shapr_common::error::ShapingError;
use shapr_common::profile::{ProfileFormat, ShapingProfile};
use tracing::{debug, trace};

pub const REAL_IP_HEADER: &str = "X-Real-IP";

/// Reads and writes the shaping profile of a single address.
#[async_trait]
pub trait ShapingClient: Send + Sync {
    /// Returns `None` when no shaping is applied to `addr`.
    async fn get_shaping(&self, addr: IpAddr) -> Result<Option<ShapingProfile>, ShapingError>;

    async fn set_shaping(&self, addr: IpAddr, profile: &ShapingProfile) -> Result<(), ShapingError>;
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// `host[:port]`, optionally prefixed with `http://` or `https://`.
    pub api_host: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_host: impl Into<String>) -> Self {
        Self {
            api_host: api_host.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for the shaping service.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpShapingClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpShapingClient {
    /// # Errors
    /// [`ShapingError::Transport`] if the underlying HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialise).
    pub fn new(config: &ClientConfig) -> Result<Self, ShapingError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ShapingError::transport)?;

        Ok(Self {
            http,
            base_url: base_url(&config.api_host),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, addr: IpAddr) -> String {
        format!("{}/api/v1/shape/{}/", self.base_url, addr)
    }
}

#[async_trait]
impl ShapingClient for HttpShapingClient {
    async fn get_shaping(&self, addr: IpAddr) -> Result<Option<ShapingProfile>, ShapingError> {
        let url = self.endpoint(addr);
        trace!("GET {url}");

        let resp = self.http.get(&url).send().await.map_err(ShapingError::transport)?;
        let status = resp.status();
        debug!("GET {url} -> {status}");

        match status {
            StatusCode::OK => {
                let body = resp.bytes().await.map_err(ShapingError::transport)?;
                ShapingProfile::from_slice(&body, ProfileFormat::Raw).map(Some)
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(unexpected(status, resp).await),
        }
    }

    async fn set_shaping(&self, addr: IpAddr, profile: &ShapingProfile) -> Result<(), ShapingError> {
        let url = self.endpoint(addr);
        trace!("POST {url}");

        let resp = self
            .http
            .post(&url)
            .header(REAL_IP_HEADER, addr.to_string())
            .json(profile.parameters())
            .send()
            .await
            .map_err(ShapingError::transport)?;

        let status = resp.status();
        debug!("POST {url} -> {status}");

        if status.is_success() {
            Ok(())
        } else {
            Err(unexpected(status, resp).await)
        }
    }
}

async fn unexpected(status: StatusCode, resp: reqwest::Response) -> ShapingError {
    let body = resp.text().await.unwrap_or_default();
    ShapingError::UnexpectedResponse {
        status: status.as_u16(),
        body,
    }
}

fn base_url(api_host: &str) -> String {
    let host = api_host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
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
