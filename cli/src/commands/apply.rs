//! `clusterfiles apply`: install every host's configured files.

use anyhow::{Context, Result};
use clusterfiles_common::ClusterConfig;

use crate::application::ports::{HostConnector, SourceMatcher};
use crate::application::services::UploadFiles;
use crate::application::{PhaseOutcome, run_phase};
use crate::output::{OutputContext, TerminalReporter};

/// Run the upload phase against `config`.
///
/// # Errors
///
/// Returns the phase error, a `DistributionError` when one or more hosts
/// failed.
pub async fn run(
    ctx: &OutputContext,
    config: &ClusterConfig,
    connector: impl HostConnector,
    matcher: impl SourceMatcher,
    json: bool,
) -> Result<PhaseOutcome> {
    let reporter = TerminalReporter::new(ctx);
    let mut phase = UploadFiles::new(connector, matcher, &reporter);
    let outcome = run_phase(&mut phase, config, &reporter).await?;

    if json {
        let status = match outcome {
            PhaseOutcome::Completed => "completed",
            PhaseOutcome::Skipped => "skipped",
        };
        let out = serde_json::json!({
            "cluster": config.metadata.name,
            "status": status,
            "hosts": phase.host_names(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("JSON serialization failed")?
        );
    } else if outcome == PhaseOutcome::Skipped {
        ctx.info("no host has files to upload");
    } else {
        ctx.success(&format!("{}: files installed", config.metadata.name));
    }
    Ok(outcome)
}
