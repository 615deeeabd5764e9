//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, local
//! glob expansion, SSH host access, and cluster file loading.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod config;
pub mod glob;
pub mod ssh_host;

pub use command_runner::TokioCommandRunner;
pub use config::YamlClusterConfig;
pub use glob::GlobMatcher;
pub use ssh_host::{SshConnector, SshHost, SshTarget};
