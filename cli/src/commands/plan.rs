//! `clusterfiles plan`: show what `apply` would install, without connecting.

use anyhow::Result;
use clusterfiles_common::ClusterConfig;

use crate::application::ports::SourceMatcher;
use crate::application::services::{HostPlan, plan_cluster};
use crate::output::json::format_plan;
use crate::output::{OutputContext, error_chain};

/// Resolve every host's files locally and print the result.
///
/// Per-host resolution errors are part of the plan, not a command failure.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub fn run(
    ctx: &OutputContext,
    config: &ClusterConfig,
    matcher: &impl SourceMatcher,
    json: bool,
) -> Result<Vec<HostPlan>> {
    let plans = plan_cluster(matcher, config);

    if json {
        println!("{}", format_plan(&config.metadata.name, &plans)?);
        return Ok(plans);
    }

    ctx.header(&format!("Cluster {}", config.metadata.name));
    if plans.is_empty() {
        ctx.info("no host has files to upload");
    }
    for plan in &plans {
        ctx.header(&plan.host);
        match &plan.uploads {
            Ok(uploads) if uploads.is_empty() => ctx.warn("no local files match"),
            Ok(uploads) => {
                for p in uploads {
                    let verb = if p.unit.is_url() { "download" } else { "upload" };
                    ctx.kv(
                        &format!("{verb} {}", p.unit),
                        &format!("{} ({})", p.destination.path(), p.unit.perm()),
                    );
                }
            }
            Err(e) => ctx.error(&format!("{}: {}", plan.host, error_chain(e))),
        }
    }
    Ok(plans)
}
