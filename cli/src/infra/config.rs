//! Infrastructure implementation of the `ClusterConfigSource` port.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clusterfiles_common::ClusterConfig;

use crate::application::ports::ClusterConfigSource;

/// Environment variable that overrides the default cluster file location.
pub const CONFIG_ENV: &str = "CLUSTERFILES_CONFIG";

/// File name used when neither `--config` nor the env var is given.
pub const DEFAULT_CONFIG_FILE: &str = "cluster.yaml";

/// Reads and validates a YAML cluster file.
pub struct YamlClusterConfig {
    path: PathBuf,
}

impl YamlClusterConfig {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Pick the cluster file: explicit flag, then `CLUSTERFILES_CONFIG`,
    /// then `./cluster.yaml`.
    #[must_use]
    pub fn locate(flag: Option<&Path>) -> Self {
        Self::choose(flag, std::env::var(CONFIG_ENV).ok())
    }

    fn choose(flag: Option<&Path>, env: Option<String>) -> Self {
        match (flag, env) {
            (Some(path), _) => Self::new(path),
            (None, Some(val)) if !val.is_empty() => Self::new(val),
            _ => Self::new(DEFAULT_CONFIG_FILE),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ClusterConfigSource for YamlClusterConfig {
    fn load(&self) -> Result<ClusterConfig> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        let config: ClusterConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid cluster config {}", self.path.display()))?;
        Ok(config)
    }
}
