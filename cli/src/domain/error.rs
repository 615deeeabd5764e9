//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Upload errors ─────────────────────────────────────────────────────────────

/// Errors raised while resolving, transferring, or installing one file.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no destination set for file {file}")]
    NoDestination { file: String },

    #[error("destination directory not set for {file} and destination is not absolute")]
    DestinationNotAbsolute { file: String },

    #[error(
        "multiple files ({matches}) found for '{file}' but no destination directory (dstDir) set"
    )]
    AmbiguousDestination { file: String, matches: usize },

    #[error("invalid glob pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("transfer of {file} failed")]
    Transfer {
        file: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("install of {file} to {destination} failed")]
    Install {
        file: String,
        destination: String,
        #[source]
        source: anyhow::Error,
    },
}

impl UploadError {
    /// Returns `true` for errors detectable from configuration alone.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::NoDestination { .. }
                | Self::DestinationNotAbsolute { .. }
                | Self::AmbiguousDestination { .. }
        )
    }
}

// ── Distribution errors ───────────────────────────────────────────────────────

/// One host whose pipeline stopped at an error.
#[derive(Debug)]
pub struct HostFailure {
    /// Display form of the host, e.g. `[ssh] 10.0.0.1:22`.
    pub host: String,
    /// The first error the host hit.
    pub error: anyhow::Error,
}

/// Every host failure from a single phase run.
#[derive(Debug, Error)]
#[error("{}", render_failures(.failures))]
pub struct DistributionError {
    pub failures: Vec<HostFailure>,
}

impl DistributionError {
    /// Look up the error recorded for `host`.
    #[must_use]
    pub fn for_host(&self, host: &str) -> Option<&anyhow::Error> {
        self.failures
            .iter()
            .find(|f| f.host == host)
            .map(|f| &f.error)
    }
}

fn render_failures(failures: &[HostFailure]) -> String {
    let mut out = format!("file upload failed on {} host(s)", failures.len());
    for failure in failures {
        out.push_str(&format!("\n  {}: {:#}", failure.host, failure.error));
    }
    out
}
