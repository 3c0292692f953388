//! # Shaping reconciliation core
//!
//! * [`client`]: the [`ShapingClient`](client::ShapingClient) port and its HTTP adapter.
//! * [`reconcile`]: the convergence loop and its per-address outcomes.
//! * [`reporter`]: where those outcomes go.
//! * [`inspect`]: a read-only pass over a range.

pub mod client;
pub mod inspect;
pub mod reconcile;
pub mod reporter;

pub use client::{ClientConfig, HttpShapingClient, ShapingClient};
pub use reconcile::{AddressReport, Outcome, Reconciler, RunSummary};
pub use reporter::{Reporter, TracingReporter};
