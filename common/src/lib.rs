//! # Shared domain values
//!
//! Types used by both the reconciliation core and the command line:
//!
//! * [`profile`]: the validated shaping parameter set and its two file encodings.
//! * [`network`]: address ranges and their traversal.
//! * [`error`]: the error taxonomy shared by every crate in the workspace.
//! * [`config`]: the run configuration assembled by the CLI.

pub mod config;
pub mod error;
pub mod network;
pub mod profile;

pub use error::ShapingError;
