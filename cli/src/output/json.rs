//! JSON output helpers.
//!
//! Provides the error-object formatter used by all `--json` code paths when
//! a command fails, and the machine-readable upload plan.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::services::HostPlan;
use crate::output::error_chain;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

#[derive(Serialize)]
struct PlanView<'a> {
    cluster: &'a str,
    hosts: Vec<HostView<'a>>,
}

#[derive(Serialize)]
struct HostView<'a> {
    host: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    files: Vec<FileView<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct FileView<'a> {
    label: &'a str,
    source: &'a str,
    transfer: &'static str,
    destination: String,
    perm: &'a str,
}

/// Render the upload plan of a cluster as pretty JSON.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_plan(cluster: &str, plans: &[HostPlan]) -> Result<String> {
    let hosts = plans
        .iter()
        .map(|plan| match &plan.uploads {
            Ok(uploads) => HostView {
                host: &plan.host,
                files: uploads
                    .iter()
                    .map(|p| FileView {
                        label: p.unit.label(),
                        source: p.unit.source(),
                        transfer: if p.unit.is_url() { "download" } else { "upload" },
                        destination: p.destination.path(),
                        perm: p.unit.perm(),
                    })
                    .collect(),
                error: None,
            },
            Err(e) => HostView {
                host: &plan.host,
                files: Vec::new(),
                error: Some(error_chain(e)),
            },
        })
        .collect();
    serde_json::to_string_pretty(&PlanView { cluster, hosts }).context("JSON serialization failed")
}
