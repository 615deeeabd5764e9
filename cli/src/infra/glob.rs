//! Infrastructure implementation of the `SourceMatcher` port.

use crate::application::ports::SourceMatcher;
use crate::domain::UploadError;

/// Expands patterns against the local filesystem with the `glob` crate.
///
/// Results come back in the crate's sorted order. Entries that cannot be
/// read while walking, and names that are not valid UTF-8, are skipped.
pub struct GlobMatcher;

impl SourceMatcher for GlobMatcher {
    fn matches(&self, pattern: &str) -> Result<Vec<String>, UploadError> {
        let paths = glob::glob(pattern).map_err(|e| UploadError::InvalidPattern {
            pattern: pattern.to_string(),
            source: Box::new(e),
        })?;
        Ok(paths
            .filter_map(|entry| match entry {
                Ok(path) => match path.into_os_string().into_string() {
                    Ok(path) => Some(path),
                    Err(raw) => {
                        tracing::warn!(
                            pattern,
                            path = %raw.to_string_lossy(),
                            "skipping match with a non-UTF-8 name"
                        );
                        None
                    }
                },
                Err(e) => {
                    tracing::debug!(pattern, error = %e, "skipping unreadable glob entry");
                    None
                }
            })
            .collect())
    }
}
