//! Cluster file schema shared by the clusterfiles crates.

pub mod config;
pub mod types;

pub use config::{ClusterConfig, ClusterSpec, ConfigError, HostSpec, Metadata, SshSpec};
pub use types::*;
