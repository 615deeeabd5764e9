//! Upload units and destination rules.
//!
//! Pure functions only, no I/O. Glob expansion happens behind the
//! `SourceMatcher` port; this module only turns the matched paths into units.

use std::fmt;

use clusterfiles_common::{FileSpec, URL_SCHEME_SEPARATOR};

use crate::domain::error::UploadError;

/// One concrete transfer-and-install instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadUnit {
    name: String,
    source: String,
    dst: String,
    dst_dir: String,
    perm: String,
}

/// Where a unit ends up on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub dir: String,
    pub file: String,
}

impl Destination {
    /// Full remote path, `dir` and `file` joined with a single `/`.
    #[must_use]
    pub fn path(&self) -> String {
        join_remote(&self.dir, &self.file)
    }
}

impl UploadUnit {
    /// Unit for `spec` with its own source and name.
    #[must_use]
    pub fn from_spec(spec: &FileSpec) -> Self {
        Self::matched(spec, spec.src.clone(), spec.name.clone())
    }

    fn matched(spec: &FileSpec, source: String, name: String) -> Self {
        Self {
            name,
            source,
            dst: spec.dst.clone(),
            dst_dir: spec.dst_dir.clone(),
            perm: spec.perm.clone(),
        }
    }

    /// `name` when set, otherwise the concrete source.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.source
        } else {
            &self.name
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn perm(&self) -> &str {
        &self.perm
    }

    #[must_use]
    pub fn is_url(&self) -> bool {
        self.source.contains(URL_SCHEME_SEPARATOR)
    }

    /// Work out the destination directory and file name.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::NoDestination`] when neither `dst` nor
    /// `dstDir` is set, and [`UploadError::DestinationNotAbsolute`] when only
    /// `dst` is set and it has no directory part.
    pub fn destination(&self) -> Result<Destination, UploadError> {
        if self.dst_dir.is_empty() {
            if self.dst.is_empty() {
                return Err(UploadError::NoDestination {
                    file: self.to_string(),
                });
            }
            let (dir, file) =
                split_remote(&self.dst).ok_or_else(|| UploadError::DestinationNotAbsolute {
                    file: self.to_string(),
                })?;
            return Ok(Destination {
                dir: dir.to_string(),
                file: file.to_string(),
            });
        }

        let file = if self.dst.is_empty() {
            base_name(&self.source).to_string()
        } else {
            self.dst.clone()
        };
        Ok(Destination {
            dir: self.dst_dir.clone(),
            file,
        })
    }
}

impl fmt::Display for UploadUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Turn the local matches of a pattern spec into units.
///
/// Zero matches yield no units. More than one match needs `dstDir`; each
/// unit is then labelled `"<label>: <path> (<n> of <total>)"`.
///
/// # Errors
///
/// Returns [`UploadError::AmbiguousDestination`] when several paths match
/// and the spec names a single destination file.
pub fn expand_matches(spec: &FileSpec, matches: &[String]) -> Result<Vec<UploadUnit>, UploadError> {
    let total = matches.len();
    if total > 1 && !spec.dst.is_empty() {
        return Err(UploadError::AmbiguousDestination {
            file: spec.to_string(),
            matches: total,
        });
    }

    Ok(matches
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let name = if total > 1 {
                format!("{}: {path} ({} of {total})", spec.label(), i + 1)
            } else {
                spec.name.clone()
            };
            UploadUnit::matched(spec, path.clone(), name)
        })
        .collect())
}

/// Split an absolute remote file path at its last `/`.
///
/// `/c.conf` splits to `("/", "c.conf")`. Returns `None` when there is no
/// separator or nothing follows it.
#[must_use]
pub fn split_remote(path: &str) -> Option<(&str, &str)> {
    let idx = path.rfind('/')?;
    let file = &path[idx + 1..];
    if file.is_empty() {
        return None;
    }
    let dir = if idx == 0 { "/" } else { &path[..idx] };
    Some((dir, file))
}

/// Last path component, ignoring trailing slashes.
#[must_use]
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.is_empty() { "." } else { "/" };
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Join a remote directory and file name with exactly one `/`.
#[must_use]
pub fn join_remote(dir: &str, file: &str) -> String {
    let dir = dir.trim_end_matches('/');
    let file = file.trim_start_matches('/');
    format!("{dir}/{file}")
}

/// Single-quote `s` for a POSIX shell.
#[must_use]
pub fn shell_quote(s: &str) -> String {
    if !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"-_./=:@%+,".contains(&b))
    {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// `install -m <mode> -D <scratch> <destination>`, every operand quoted.
#[must_use]
pub fn install_command(perm: &str, scratch: &str, destination: &str) -> String {
    format!(
        "install -m {} -D {} {}",
        shell_quote(perm),
        shell_quote(scratch),
        shell_quote(destination)
    )
}

/// Command that deletes a scratch file, tolerating its absence.
#[must_use]
pub fn remove_command(scratch: &str) -> String {
    format!("rm -f -- {}", shell_quote(scratch))
}

// ── Unit tests ───────────────────────────────────────────────────────────────
