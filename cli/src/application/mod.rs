//! Application layer: port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain`, never on `crate::infra`,
//! `crate::commands`, or `crate::output`.

pub mod phase;
pub mod ports;
pub mod services;

pub use phase::{Phase, PhaseOutcome, run_phase};
pub use ports::{
    ClusterConfigSource, CommandRunner, FileTransfer, HostConnector, Privilege, ProgressReporter,
    RemoteHost, ScratchAllocator, ShellExecutor, SourceMatcher,
};
