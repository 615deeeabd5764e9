//! Infrastructure implementation of the host port traits over OpenSSH.
//!
//! `SshHost<R>` routes every `ssh`/`scp` invocation through a
//! `CommandRunner`, so tests can inject a recording runner without
//! spawning real processes.

use std::path::PathBuf;
use std::process::Output;

use anyhow::{Context, Result};
use clusterfiles_common::HostSpec;

use crate::application::ports::{
    CommandRunner, FileTransfer, HostConnector, Privilege, ScratchAllocator, ShellExecutor,
};
use crate::domain::upload::shell_quote;
use crate::infra::command_runner::{
    DEFAULT_CMD_TIMEOUT, DEFAULT_TRANSFER_TIMEOUT, TokioCommandRunner,
};

/// Options passed to every `ssh`/`scp` call.
const SSH_OPTIONS: &[&str] = &["-o", "BatchMode=yes", "-o", "ConnectTimeout=10"];

/// Where and how to reach one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub address: String,
    pub user: String,
    pub port: u16,
    pub key_path: Option<PathBuf>,
}

impl SshTarget {
    fn login(&self) -> String {
        format!("{}@{}", self.user, self.address)
    }

    /// `user@host:path`, bracketing IPv6 literals.
    fn remote_path(&self, path: &str) -> String {
        if self.address.contains(':') {
            format!("{}@[{}]:{path}", self.user, self.address)
        } else {
            format!("{}:{path}", self.login())
        }
    }

    fn common_args(&self, port_flag: &str) -> Vec<String> {
        let mut args: Vec<String> = SSH_OPTIONS.iter().map(|s| (*s).to_string()).collect();
        args.push(port_flag.to_string());
        args.push(self.port.to_string());
        if let Some(key) = &self.key_path {
            args.push("-i".to_string());
            args.push(key.display().to_string());
        }
        args
    }

    fn ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = self.common_args("-p");
        args.push(self.login());
        args.push(command.to_string());
        args
    }

    fn scp_args(&self, local: &str, remote: &str) -> Vec<String> {
        let mut args = self.common_args("-P");
        args.push("-q".to_string());
        args.push("--".to_string());
        args.push(local_operand(local));
        args.push(self.remote_path(remote));
        args
    }
}

/// Local path as an `scp` operand. Relative paths get a `./` prefix so a
/// leading `-` is not an option and a `:` is not read as `host:path`.
fn local_operand(local: &str) -> String {
    if local.starts_with('/') || local.starts_with("./") {
        local.to_string()
    } else {
        format!("./{local}")
    }
}

/// Host capability backed by the `ssh` and `scp` binaries.
pub struct SshHost<R: CommandRunner> {
    target: SshTarget,
    cmd_runner: R,
    transfer_runner: R,
}

impl<R: CommandRunner> SshHost<R> {
    /// Create a host with explicit runner instances.
    pub fn new(target: SshTarget, cmd_runner: R, transfer_runner: R) -> Self {
        Self {
            target,
            cmd_runner,
            transfer_runner,
        }
    }

    async fn ssh(&self, runner: &R, command: &str) -> Result<Output> {
        let args = self.target.ssh_args(command);
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = runner
            .run("ssh", &argv)
            .await
            .with_context(|| format!("ssh {}", self.target.login()))?;
        ensure_success(output, command)
    }
}

impl<R: CommandRunner> ScratchAllocator for SshHost<R> {
    async fn allocate_scratch(&self) -> Result<String> {
        let output = self.ssh(&self.cmd_runner, "mktemp").await?;
        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        anyhow::ensure!(!path.is_empty(), "mktemp returned no path");
        Ok(path)
    }
}

impl<R: CommandRunner> FileTransfer for SshHost<R> {
    async fn upload(&self, local: &str, remote: &str) -> Result<()> {
        let args = self.target.scp_args(local, remote);
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self
            .transfer_runner
            .run("scp", &argv)
            .await
            .context("scp")?;
        ensure_success(output, &format!("scp {local}"))?;
        Ok(())
    }

    async fn download_url(&self, url: &str, remote: &str) -> Result<()> {
        let command = format!(
            "curl -fsSL -o {} {}",
            shell_quote(remote),
            shell_quote(url)
        );
        self.ssh(&self.transfer_runner, &command).await?;
        Ok(())
    }
}

impl<R: CommandRunner> ShellExecutor for SshHost<R> {
    async fn execute(&self, command: &str, privilege: Privilege) -> Result<()> {
        let line = match privilege {
            Privilege::Root if self.target.user != "root" => {
                format!("sudo -n -- sh -c {}", shell_quote(command))
            }
            _ => command.to_string(),
        };
        self.ssh(&self.cmd_runner, &line).await?;
        Ok(())
    }
}

/// Turn a non-zero exit into an error carrying the trimmed stderr.
fn ensure_success(output: Output, what: &str) -> Result<Output> {
    if output.status.success() {
        return Ok(output);
    }
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let code = output
        .status
        .code()
        .map_or_else(|| "signal".to_string(), |c| c.to_string());
    if stderr.is_empty() {
        anyhow::bail!("`{what}` exited with status {code}");
    }
    anyhow::bail!("`{what}` exited with status {code}: {stderr}")
}

/// Builds an `SshHost` for each configured host.
pub struct SshConnector;

impl HostConnector for SshConnector {
    type Host = SshHost<TokioCommandRunner>;

    fn connect(&self, spec: &HostSpec) -> Result<Self::Host> {
        let key_path = spec
            .ssh
            .key_path
            .as_deref()
            .map(expand_home)
            .transpose()?;
        if let Some(path) = &key_path {
            anyhow::ensure!(
                path.exists(),
                "ssh key {} does not exist",
                path.display()
            );
        }
        let target = SshTarget {
            address: spec.ssh.address.clone(),
            user: spec.ssh.user.clone(),
            port: spec.ssh.port,
            key_path,
        };
        tracing::debug!(host = %spec, ?target, "ssh target prepared");
        Ok(SshHost::new(
            target,
            TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT),
            TokioCommandRunner::new(DEFAULT_TRANSFER_TIMEOUT),
        ))
    }
}

/// Expand a leading `~/` to the user's home directory.
fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}
