use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::FileSpec;

/// Errors found while validating a cluster file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("spec.hosts is empty: at least one host is required")]
    NoHosts,

    #[error("host #{index}: ssh.address is required")]
    MissingAddress { index: usize },

    #[error("host {host}: ssh.port must be non-zero")]
    InvalidPort { host: String },

    #[error("host {host}: file #{index} has an empty src")]
    EmptySource { host: String, index: usize },

    #[error("host {host}: file '{file}' has invalid perm '{perm}' (expected 3-4 octal digits or a symbolic mode such as u=rw,go=r)")]
    InvalidPermMode {
        host: String,
        file: String,
        perm: String,
    },
}

/// Top-level cluster file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub metadata: Metadata,
    pub spec: ClusterSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    #[serde(default = "default_cluster_name")]
    pub name: String,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            name: default_cluster_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ClusterSpec {
    #[serde(default)]
    pub hosts: Vec<HostSpec>,
}

/// One target host and the files it should receive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostSpec {
    pub ssh: SshSpec,
    #[serde(default)]
    pub files: Vec<FileSpec>,
}

/// SSH connection settings for a host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SshSpec {
    pub address: String,
    #[serde(default = "default_ssh_user")]
    pub user: String,
    #[serde(default = "default_ssh_port")]
    pub port: u16,
    /// Private key passed to `ssh -i`. Uses the ssh agent/config when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_path: Option<String>,
}

impl SshSpec {
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            user: default_ssh_user(),
            port: default_ssh_port(),
            key_path: None,
        }
    }
}

fn default_api_version() -> String {
    "clusterfiles/v1".to_string()
}

fn default_kind() -> String {
    "Cluster".to_string()
}

fn default_cluster_name() -> String {
    "clusterfiles".to_string()
}

fn default_ssh_user() -> String {
    "root".to_string()
}

fn default_ssh_port() -> u16 {
    22
}

impl fmt::Display for HostSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ssh] {}:{}", self.ssh.address, self.ssh.port)
    }
}

impl ClusterConfig {
    /// Check the structural rules serde cannot express.
    ///
    /// Returns the first violation found, in host order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spec.hosts.is_empty() {
            return Err(ConfigError::NoHosts);
        }
        for (index, host) in self.spec.hosts.iter().enumerate() {
            if host.ssh.address.trim().is_empty() {
                return Err(ConfigError::MissingAddress { index: index + 1 });
            }
            if host.ssh.port == 0 {
                return Err(ConfigError::InvalidPort {
                    host: host.to_string(),
                });
            }
            for (index, file) in host.files.iter().enumerate() {
                if file.src.is_empty() {
                    return Err(ConfigError::EmptySource {
                        host: host.to_string(),
                        index: index + 1,
                    });
                }
                if !is_valid_perm_mode(&file.perm) {
                    return Err(ConfigError::InvalidPermMode {
                        host: host.to_string(),
                        file: file.to_string(),
                        perm: file.perm.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Returns `true` for 3 or 4 octal digits (`644`, `0755`) or a `chmod`
/// style symbolic mode (`u=rw,go=r`, `a+x`).
#[must_use]
pub fn is_valid_perm_mode(perm: &str) -> bool {
    let octal = (3..=4).contains(&perm.len()) && perm.bytes().all(|b| (b'0'..=b'7').contains(&b));
    octal || perm.split(',').all(is_symbolic_clause)
}

/// One `[ugoa]*([-+=]([rwxXst]*|[ugo]))+` clause of a symbolic mode.
fn is_symbolic_clause(clause: &str) -> bool {
    let actions = clause.trim_start_matches(['u', 'g', 'o', 'a']);
    if actions.is_empty() {
        return false;
    }
    let mut chars = actions.chars().peekable();
    while let Some(op) = chars.next() {
        if !matches!(op, '+' | '-' | '=') {
            return false;
        }
        let mut perms = String::new();
        while let Some(&c) = chars.peek() {
            if matches!(c, '+' | '-' | '=') {
                break;
            }
            perms.push(c);
            chars.next();
        }
        let copies = matches!(perms.as_str(), "u" | "g" | "o");
        if !copies && !perms.chars().all(|c| "rwxXst".contains(c)) {
            return false;
        }
    }
    true
}
