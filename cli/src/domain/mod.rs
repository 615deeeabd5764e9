//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod error;
pub mod upload;

pub use error::{DistributionError, HostFailure, UploadError};
pub use upload::{Destination, UploadUnit, expand_matches, install_command, remove_command};
