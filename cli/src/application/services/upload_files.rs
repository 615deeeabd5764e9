//! The "upload files to hosts" phase.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Each host runs resolve → transfer → install sequentially; hosts run
//! concurrently and fail independently.

use anyhow::Result;
use clusterfiles_common::{ClusterConfig, FileSpec};
use futures_util::future::join_all;

use crate::application::phase::Phase;
use crate::application::ports::{
    FileTransfer, HostConnector, Privilege, ProgressReporter, ScratchAllocator, ShellExecutor,
    SourceMatcher,
};
use crate::application::services::resolve::{PlannedUpload, plan_uploads};
use crate::domain::upload::{install_command, remove_command};
use crate::domain::{DistributionError, HostFailure, UploadError};

/// A host selected during `prepare`, with its opened capability or the
/// reason it could not be opened.
struct TargetHost<H> {
    name: String,
    files: Vec<FileSpec>,
    remote: std::result::Result<H, String>,
}

/// Phase that installs every host's configured files.
pub struct UploadFiles<C: HostConnector, M: SourceMatcher, R: ProgressReporter> {
    connector: C,
    matcher: M,
    reporter: R,
    hosts: Vec<TargetHost<C::Host>>,
}

impl<C: HostConnector, M: SourceMatcher, R: ProgressReporter> UploadFiles<C, M, R> {
    #[must_use]
    pub fn new(connector: C, matcher: M, reporter: R) -> Self {
        Self {
            connector,
            matcher,
            reporter,
            hosts: Vec::new(),
        }
    }

    /// Names of the hosts selected by the last `prepare`.
    #[must_use]
    pub fn host_names(&self) -> Vec<&str> {
        self.hosts.iter().map(|h| h.name.as_str()).collect()
    }

    async fn upload_host(&self, host: &TargetHost<C::Host>) -> Result<usize> {
        let remote = host
            .remote
            .as_ref()
            .map_err(|e| anyhow::anyhow!("opening connection: {e}"))?;
        let mut planned = Vec::new();
        for file in &host.files {
            self.reporter
                .step(&format!("{}: starting upload of {file}", host.name));
            let before = planned.len();
            planned.extend(plan_uploads(&self.matcher, std::slice::from_ref(file))?);
            if planned.len() == before {
                self.reporter
                    .warn(&format!("{}: no local files match {}", host.name, file.src));
            }
        }

        for item in &planned {
            self.upload_one(&host.name, remote, item).await?;
        }
        Ok(planned.len())
    }

    async fn upload_one(&self, name: &str, remote: &C::Host, item: &PlannedUpload) -> Result<()> {
        let unit = &item.unit;
        let scratch = remote
            .allocate_scratch()
            .await
            .map_err(|source| UploadError::Transfer {
                file: unit.to_string(),
                source: source.context("allocating scratch path"),
            })?;
        tracing::debug!(host = name, file = %unit, %scratch, "scratch path allocated");

        let result = self.transfer_and_install(name, remote, item, &scratch).await;

        if let Err(e) = remote
            .execute(&remove_command(&scratch), Privilege::User)
            .await
        {
            tracing::debug!(host = name, %scratch, error = %e, "scratch cleanup failed");
        }
        result
    }

    async fn transfer_and_install(
        &self,
        name: &str,
        remote: &C::Host,
        item: &PlannedUpload,
        scratch: &str,
    ) -> Result<()> {
        let unit = &item.unit;
        let transferred = if unit.is_url() {
            self.reporter.step(&format!("{name}: downloading {unit}"));
            remote.download_url(unit.source(), scratch).await
        } else {
            self.reporter.step(&format!("{name}: uploading {unit}"));
            remote.upload(unit.source(), scratch).await
        };
        transferred.map_err(|source| UploadError::Transfer {
            file: unit.to_string(),
            source,
        })?;

        let dest = item.destination.path();
        self.reporter
            .step(&format!("{name}: installing {unit} to {dest}"));
        remote
            .execute(&install_command(unit.perm(), scratch, &dest), Privilege::Root)
            .await
            .map_err(|source| UploadError::Install {
                file: unit.to_string(),
                destination: dest.clone(),
                source,
            })?;
        Ok(())
    }
}

impl<C: HostConnector, M: SourceMatcher, R: ProgressReporter> Phase for UploadFiles<C, M, R> {
    fn title(&self) -> &str {
        "Upload files to hosts"
    }

    /// Connect every host that has files. A host that cannot be opened is
    /// kept and reported as failed by `run`, so the others still proceed.
    fn prepare(&mut self, config: &ClusterConfig) -> Result<()> {
        let mut hosts = Vec::new();
        for spec in config.spec.hosts.iter().filter(|h| !h.files.is_empty()) {
            let name = spec.to_string();
            let remote = self.connector.connect(spec).map_err(|e| {
                tracing::warn!(host = %name, error = %format!("{e:#}"), "cannot open host");
                format!("{e:#}")
            });
            hosts.push(TargetHost {
                name,
                files: spec.files.clone(),
                remote,
            });
        }
        self.hosts = hosts;
        Ok(())
    }

    fn should_run(&self) -> bool {
        !self.hosts.is_empty()
    }

    async fn run(&self) -> Result<()> {
        let results = join_all(self.hosts.iter().map(|host| async move {
            let outcome = self.upload_host(host).await;
            (host, outcome)
        }))
        .await;

        let mut failures = Vec::new();
        for (host, outcome) in results {
            match outcome {
                Ok(count) => self
                    .reporter
                    .success(&format!("{}: {count} file(s) installed", host.name)),
                Err(error) => {
                    tracing::debug!(host = %host.name, error = %format!("{error:#}"), "host failed");
                    failures.push(HostFailure {
                        host: host.name.clone(),
                        error,
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DistributionError { failures }.into())
        }
    }
}
