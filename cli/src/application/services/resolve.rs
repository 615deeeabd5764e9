//! Expands file specs into upload units.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Local glob expansion is routed through the injected `SourceMatcher`.

use clusterfiles_common::{ClusterConfig, FileSpec};

use crate::application::ports::SourceMatcher;
use crate::domain::UploadError;
use crate::domain::upload::{Destination, UploadUnit, expand_matches};

/// A unit together with its resolved destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpload {
    pub unit: UploadUnit,
    pub destination: Destination,
}

/// Expand one spec into the units it stands for.
///
/// URLs pass through untouched, even when they contain glob
/// metacharacters. Patterns that match nothing yield an empty list.
///
/// # Errors
///
/// Returns [`UploadError::InvalidPattern`] for malformed patterns and
/// [`UploadError::AmbiguousDestination`] when several files match a spec
/// that names a single destination file.
pub fn resolve_spec(
    matcher: &impl SourceMatcher,
    spec: &FileSpec,
) -> Result<Vec<UploadUnit>, UploadError> {
    if spec.is_url() {
        return Ok(vec![UploadUnit::from_spec(spec)]);
    }
    let matches = matcher.matches(&spec.src)?;
    expand_matches(spec, &matches)
}

/// Resolve every spec of a host, in order, along with each destination.
///
/// Destinations are computed here so a bad destination stops the host
/// before anything is transferred.
///
/// # Errors
///
/// Returns the first resolution or destination error.
pub fn plan_uploads(
    matcher: &impl SourceMatcher,
    files: &[FileSpec],
) -> Result<Vec<PlannedUpload>, UploadError> {
    let mut planned = Vec::new();
    for spec in files {
        for unit in resolve_spec(matcher, spec)? {
            let destination = unit.destination()?;
            planned.push(PlannedUpload { unit, destination });
        }
    }
    Ok(planned)
}

/// Resolution outcome for one host, used by the plan preview.
#[derive(Debug)]
pub struct HostPlan {
    pub host: String,
    pub uploads: Result<Vec<PlannedUpload>, UploadError>,
}

/// Resolve every host that has files, without touching any host.
#[must_use]
pub fn plan_cluster(matcher: &impl SourceMatcher, config: &ClusterConfig) -> Vec<HostPlan> {
    config
        .spec
        .hosts
        .iter()
        .filter(|h| !h.files.is_empty())
        .map(|h| HostPlan {
            host: h.to_string(),
            uploads: plan_uploads(matcher, &h.files),
        })
        .collect()
}
