//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::application::ports::ClusterConfigSource;
use crate::commands;
use crate::infra::{GlobMatcher, SshConnector, YamlClusterConfig};
use crate::output::OutputContext;

/// Install local files and URLs onto a cluster of hosts over SSH
#[derive(Parser)]
#[command(
    name = "clusterfiles",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Increase diagnostic logging (`-v` debug, `-vv` trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Cluster file (default: $CLUSTERFILES_CONFIG, then ./cluster.yaml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload and install every host's files
    Apply,

    /// Show what apply would install, without connecting
    Plan,

    /// Show version
    Version,
}

impl Cli {
    /// Default `tracing` filter directive for the chosen verbosity.
    #[must_use]
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster file cannot be loaded or the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            no_color,
            quiet,
            json,
            config,
            command,
            ..
        } = self;
        // JSON output owns stdout.
        let ctx = OutputContext::new(no_color, quiet || json);
        match command {
            Command::Version => {
                commands::version::run(json);
                Ok(())
            }
            Command::Plan => {
                let cluster = YamlClusterConfig::locate(config.as_deref()).load()?;
                commands::plan::run(&ctx, &cluster, &GlobMatcher, json)?;
                Ok(())
            }
            Command::Apply => {
                let cluster = YamlClusterConfig::locate(config.as_deref()).load()?;
                commands::apply::run(&ctx, &cluster, SshConnector, GlobMatcher, json).await?;
                Ok(())
            }
        }
    }
}
