//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and the shared config
//! schema, never from `crate::infra`, `crate::commands`, or `crate::output`.

use std::process::Output;

use anyhow::Result;
use clusterfiles_common::{ClusterConfig, HostSpec};

use crate::domain::UploadError;

// ── Value Types ───────────────────────────────────────────────────────────────

/// Privilege level for a command run on a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    /// Run as the connecting user.
    User,
    /// Run elevated (`sudo`).
    Root,
}

// ── Host Port Traits ──────────────────────────────────────────────────────────

/// Allocation of transient landing paths on a host.
#[allow(async_fn_in_trait)]
pub trait ScratchAllocator {
    /// Create an empty scratch file on the host and return its path.
    async fn allocate_scratch(&self) -> Result<String>;
}

/// Moving file bytes onto a host.
#[allow(async_fn_in_trait)]
pub trait FileTransfer {
    /// Push a local file from the controller to `remote`.
    async fn upload(&self, local: &str, remote: &str) -> Result<()>;
    /// Have the host fetch `url` into `remote` itself.
    async fn download_url(&self, url: &str, remote: &str) -> Result<()>;
}

/// Command execution on a host.
#[allow(async_fn_in_trait)]
pub trait ShellExecutor {
    /// Run a shell command line, failing on a non-zero exit status.
    async fn execute(&self, command: &str, privilege: Privilege) -> Result<()>;
}

/// Everything the upload pipeline needs from one host.
pub trait RemoteHost: ScratchAllocator + FileTransfer + ShellExecutor {}

/// Blanket implementation: any type implementing all three sub-traits is a `RemoteHost`.
impl<T> RemoteHost for T where T: ScratchAllocator + FileTransfer + ShellExecutor {}

/// Opens a host capability for a configured host.
pub trait HostConnector {
    type Host: RemoteHost;

    /// Build the capability for `spec`. Called only for hosts that have work.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection settings are unusable.
    fn connect(&self, spec: &HostSpec) -> Result<Self::Host>;
}

impl<T: HostConnector + ?Sized> HostConnector for &T {
    type Host = T::Host;

    fn connect(&self, spec: &HostSpec) -> Result<Self::Host> {
        (**self).connect(spec)
    }
}

// ── Local Filesystem Port ─────────────────────────────────────────────────────

/// Expands local glob patterns.
#[cfg_attr(test, mockall::automock)]
pub trait SourceMatcher {
    /// Every local path matching `pattern`, in sorted order.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::InvalidPattern`] for malformed patterns.
    fn matches(&self, pattern: &str) -> std::result::Result<Vec<String>, UploadError>;
}

// ── Configuration Port ────────────────────────────────────────────────────────

/// Supplies the validated cluster configuration.
pub trait ClusterConfigSource {
    /// Load and validate the cluster file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable, malformed, or invalid.
    fn load(&self) -> Result<ClusterConfig>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Synchronous.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

impl<T: ProgressReporter + ?Sized> ProgressReporter for &T {
    fn step(&self, message: &str) {
        (**self).step(message);
    }

    fn success(&self, message: &str) {
        (**self).success(message);
    }

    fn warn(&self, message: &str) {
        (**self).warn(message);
    }
}
