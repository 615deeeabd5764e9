//! Phase lifecycle contract and the runner that drives it.

use anyhow::Result;
use clusterfiles_common::ClusterConfig;

use crate::application::ports::ProgressReporter;

/// One step of an apply run.
///
/// The runner calls `prepare`, then `run` only when `should_run` is true.
#[allow(async_fn_in_trait)]
pub trait Phase {
    /// Human-readable title shown before the phase runs.
    fn title(&self) -> &str;

    /// Inspect the configuration and capture what the phase will act on.
    ///
    /// # Errors
    ///
    /// Returns an error if the phase cannot be set up from `config`.
    fn prepare(&mut self, config: &ClusterConfig) -> Result<()>;

    /// Whether `prepare` found anything to do.
    fn should_run(&self) -> bool;

    /// Execute the phase.
    async fn run(&self) -> Result<()>;
}

/// Outcome of driving one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    Completed,
    Skipped,
}

/// Drive `phase` through prepare, applicability check, and run.
///
/// # Errors
///
/// Returns the error from `prepare` or `run`.
pub async fn run_phase(
    phase: &mut impl Phase,
    config: &ClusterConfig,
    reporter: &impl ProgressReporter,
) -> Result<PhaseOutcome> {
    phase.prepare(config)?;
    if !phase.should_run() {
        tracing::debug!(phase = phase.title(), "phase skipped");
        return Ok(PhaseOutcome::Skipped);
    }
    reporter.step(&format!("==> {}", phase.title()));
    phase.run().await?;
    Ok(PhaseOutcome::Completed)
}
